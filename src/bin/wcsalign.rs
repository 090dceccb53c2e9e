use std::{fs::File, io};

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

use wcsalign::{
    catalog::{external::ExternalCatalogGenerator, make_source_catalog, CatalogParams},
    config::WcsAlignConfig,
    engine::external::ExternalEngine,
    file_list::FileInput,
    header::{clear_alt_wcs, fits::FitsHeaderStore},
    log_setup::setup_logging,
    parameters::{FitGeometry, ParamValue, ParameterOverrides},
    session::console::LineConsole,
    targets::{register, RegistrationTarget},
    Session, SessionOptions, WcsAlignError,
};

#[derive(Parser, Debug)]
#[command(
    name = "wcsalign",
    about = "Register exposures and write their WCS solution under a label",
    version
)]
struct Cli {
    /// YAML configuration file (bridge commands, default parameters, logging)
    #[arg(long, global = true)]
    config: Option<Utf8PathBuf>,

    /// Log level, overrides the configuration file
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Align the exposures of one visit on the first of them (label INTRAVIS)
    IntraVisit(RegisterArgs),

    /// Align exposures on the WCS of the first one (label FIRSTIM:<file>)
    ToFirst(RegisterArgs),

    /// Align exposures on a reference image (label REFIM:<refimage>)
    ToRef {
        /// Drizzled, CR-cleaned reference image
        #[arg(long)]
        refimage: Utf8PathBuf,

        /// Absolute reference catalog, RA DEC MAG in columns 1 2 3
        #[arg(long)]
        refcat: Option<Utf8PathBuf>,

        #[command(flatten)]
        args: RegisterArgs,
    },

    /// Remove alternate WCS solutions (except 'O') from every header unit
    ClearAltWcs {
        /// Files: comma list, glob, or @listfile
        files: String,
    },

    /// Detect the sources of one image and print them as CSV
    Catalog {
        image: Utf8PathBuf,

        #[arg(long, default_value_t = 4.0)]
        threshold: f64,

        #[arg(long)]
        peakmin: Option<f64>,

        #[arg(long)]
        peakmax: Option<f64>,

        /// Sky noise; disables the noise estimate from the image
        #[arg(long)]
        skysigma: Option<f64>,

        /// Output CSV file, stdout if absent
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,
    },
}

#[derive(Args, Debug)]
struct RegisterArgs {
    /// Files: comma list, glob, or @listfile
    files: String,

    /// Tune the parameters over preview runs before committing
    #[arg(short, long)]
    interactive: bool,

    /// Register even if the WCS label already exists
    #[arg(long)]
    clobber: bool,

    /// Keep the intermediate files of the registration engine
    #[arg(long)]
    debug: bool,

    /// Run a preview before the first confirmation prompt
    #[arg(long)]
    initial_preview: bool,

    #[arg(long)]
    rfluxmin: Option<f64>,

    #[arg(long)]
    rfluxmax: Option<f64>,

    #[arg(long)]
    searchrad: Option<f64>,

    #[arg(long)]
    peakmin: Option<f64>,

    #[arg(long)]
    peakmax: Option<f64>,

    #[arg(long)]
    threshold: Option<f64>,

    /// shift, rscale or general
    #[arg(long)]
    fitgeometry: Option<String>,
}

impl RegisterArgs {
    fn overrides(&self) -> ParameterOverrides {
        ParameterOverrides {
            rfluxmin: self.rfluxmin.map(ParamValue::from),
            rfluxmax: self.rfluxmax.map(ParamValue::from),
            searchrad: self.searchrad.map(ParamValue::from),
            peakmin: self.peakmin.map(ParamValue::from),
            peakmax: self.peakmax.map(ParamValue::from),
            threshold: self.threshold.map(ParamValue::from),
            fitgeometry: self.fitgeometry.as_deref().map(FitGeometry::from),
        }
    }

    fn options(&self, config: &WcsAlignConfig) -> SessionOptions {
        SessionOptions {
            interactive: self.interactive,
            clobber: self.clobber,
            debug: self.debug,
            initial_preview: self.initial_preview || config.initial_preview,
        }
    }
}

fn run_registration(
    config: &WcsAlignConfig,
    target: RegistrationTarget,
    args: &RegisterArgs,
) -> Result<(), WcsAlignError> {
    let mut params = target.default_params();
    config
        .parameters
        .clone()
        .merged_with(&args.overrides())
        .apply_to(&mut params);

    let mut session = Session::new(
        FitsHeaderStore::new(),
        ExternalEngine::new(config.engine.clone()),
        LineConsole::stdio(),
        args.options(config),
    );
    let input = FileInput::from(args.files.as_str());
    let result = register(&mut session, &target, &input, params)?;

    if result.skipped {
        println!("{} already present, nothing done", result.wcsname);
    } else {
        println!(
            "{} written after {} tweakreg run(s)",
            result.wcsname, result.invocations
        );
    }
    Ok(())
}

fn main() -> Result<(), WcsAlignError> {
    let cli = Cli::parse();
    let config = WcsAlignConfig::load_or_default(cli.config.as_deref())?;
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let _logger = setup_logging(level, config.log_dir.as_deref())?;

    match cli.command {
        Commands::IntraVisit(args) => {
            run_registration(&config, RegistrationTarget::IntraVisit, &args)?
        }
        Commands::ToFirst(args) => {
            run_registration(&config, RegistrationTarget::FirstImage, &args)?
        }
        Commands::ToRef {
            refimage,
            refcat,
            args,
        } => run_registration(
            &config,
            RegistrationTarget::ReferenceImage { refimage, refcat },
            &args,
        )?,
        Commands::ClearAltWcs { files } => {
            let files = FileInput::from(files).resolve()?;
            let cleaned = clear_alt_wcs(&mut FitsHeaderStore::new(), &files)?;
            println!("{cleaned} header unit(s) cleaned in {} file(s)", files.len());
        }
        Commands::Catalog {
            image,
            threshold,
            peakmin,
            peakmax,
            skysigma,
            output,
        } => {
            let params = CatalogParams {
                computesig: skysigma.is_none(),
                skysigma: skysigma.unwrap_or(0.0),
                threshold,
                peakmin: ParamValue::from(peakmin),
                peakmax: ParamValue::from(peakmax),
            };
            let mut generator = ExternalCatalogGenerator::new(config.catalog.clone());
            let catalog =
                make_source_catalog(&mut FitsHeaderStore::new(), &mut generator, &image, params)?;
            match output {
                Some(path) => catalog.write_csv(File::create(path)?)?,
                None => catalog.write_csv(io::stdout().lock())?,
            }
        }
    }
    Ok(())
}
