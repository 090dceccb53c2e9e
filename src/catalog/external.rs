use log::debug;

use super::{CatalogGenerator, CatalogRequest, Source, SourceCatalog};
use crate::{bridge::BridgeCommand, wcsalign_errors::WcsAlignError};

/// [`CatalogGenerator`] running a catalog bridge command.
///
/// The bridge receives the [`CatalogRequest`] as JSON and prints a CSV table with an
/// `id,x,y,flux` header on stdout.
#[derive(Debug, Clone)]
pub struct ExternalCatalogGenerator {
    command: BridgeCommand,
}

impl ExternalCatalogGenerator {
    pub fn new(command: BridgeCommand) -> Self {
        ExternalCatalogGenerator { command }
    }
}

/// Parse a CSV source table with an `id,x,y,flux` header.
pub fn parse_source_table(table: &str) -> Result<Vec<Source>, WcsAlignError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(table.as_bytes());
    rdr.deserialize()
        .collect::<Result<Vec<Source>, _>>()
        .map_err(WcsAlignError::from)
}

impl CatalogGenerator for ExternalCatalogGenerator {
    fn generate(&mut self, request: &CatalogRequest) -> Result<SourceCatalog, WcsAlignError> {
        let stdout = self.command.run_json("catalog", request)?;
        let sources = parse_source_table(&stdout)?;
        debug!("{}: {} row(s) from {}", request.image, sources.len(), self.command.display());
        Ok(SourceCatalog {
            image: request.image.clone(),
            sources,
        })
    }
}

#[cfg(test)]
mod test_external_catalog {
    use super::*;

    #[test]
    fn test_parse_table() {
        let table = "# imagefind\nid, x, y, flux\n1, 102.3, 88.1, 5230.0\n2, 15.0, 400.5, 812.5\n";
        let sources = parse_source_table(table).unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[1].id, 2);
        assert_eq!(sources[1].y, 400.5);
    }

    #[test]
    fn test_bad_row() {
        let table = "id,x,y,flux\n1,abc,2.0,3.0\n";
        assert!(matches!(
            parse_source_table(table).unwrap_err(),
            WcsAlignError::CsvError(_)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_bridge_table() {
        use crate::catalog::CatalogParams;

        let mut gen = ExternalCatalogGenerator::new(BridgeCommand::new("sh").with_args([
            "-c",
            "cat >/dev/null; printf 'id,x,y,flux\\n7,1.5,2.5,99.0\\n'",
        ]));
        let request = CatalogRequest {
            image: "j01_flt.fits".into(),
            conv_width: 3.5,
            params: CatalogParams::default(),
        };
        let catalog = gen.generate(&request).unwrap();
        assert_eq!(catalog.image, "j01_flt.fits");
        assert_eq!(catalog.sources[0].id, 7);
    }
}
