mod common;

use camino::{Utf8Path, Utf8PathBuf};
use common::{RecordingEngine, SharedStore};
use wcsalign::{
    config::WcsAlignConfig,
    file_list::FileInput,
    parameters::{FitGeometry, ParamValue},
    session::console::LineConsole,
    targets::{intra_visit, register, to_first_image, to_reference_image, RegistrationTarget},
    Session, SessionOptions, WcsAlignError,
};

#[test]
fn test_intra_visit_uses_shift() {
    let store = SharedStore::with_camera(&["j01_flt.fits", "j02_flt.fits"], "ACS", "WFC");
    let mut engine = RecordingEngine::writing_to(&store);
    let mut console = LineConsole::new(&b""[..], Vec::new());
    let mut session = Session::new(
        store.clone(),
        &mut engine,
        &mut console,
        SessionOptions::default(),
    );

    let result = intra_visit(&mut session, &"j01_flt.fits,j02_flt.fits".into()).unwrap();
    drop(session);

    assert_eq!(result.wcsname, "INTRAVIS");
    assert_eq!(result.params.fitgeometry, FitGeometry::Shift);
    assert_eq!(engine.requests[0].files.len(), 2);
    assert_eq!(
        store.primary("j02_flt.fits", "WCSNAME").as_deref(),
        Some("INTRAVIS")
    );
}

#[test]
fn test_first_image_label_from_basename() {
    let store = SharedStore::with_camera(&["/data/v1/ib01_flt.fits"], "WFC3", "IR");
    let mut engine = RecordingEngine::default();
    let mut console = LineConsole::new(&b""[..], Vec::new());
    let mut session = Session::new(
        store.clone(),
        &mut engine,
        &mut console,
        SessionOptions::default(),
    );

    let input = FileInput::List(vec![
        "/data/v1/ib01_flt.fits".into(),
        "/data/v1/ib02_flt.fits".into(),
    ]);
    let result = to_first_image(&mut session, &input).unwrap();

    assert_eq!(result.wcsname, "FIRSTIM:ib01_flt.fits");
}

#[test]
fn test_reference_image_request() {
    let store = SharedStore::with_camera(&["j01_flt.fits"], "ACS", "WFC");
    let mut engine = RecordingEngine::default();
    let mut console = LineConsole::new(&b""[..], Vec::new());
    let mut session = Session::new(
        store.clone(),
        &mut engine,
        &mut console,
        SessionOptions::default(),
    );

    let result = to_reference_image(
        &mut session,
        &"j01_flt.fits".into(),
        Utf8Path::new("ref/deep_drz.fits"),
        Some(Utf8Path::new("ref/gaia.cat")),
    )
    .unwrap();
    drop(session);

    assert_eq!(result.wcsname, "REFIM:deep_drz.fits");
    let request = &engine.requests[0];
    assert_eq!(request.refimage, Some(Utf8PathBuf::from("ref/deep_drz.fits")));
    assert_eq!(request.refcat, Some(Utf8PathBuf::from("ref/gaia.cat")));
    assert_eq!(request.params.rfluxmin, ParamValue::Number(18.0));
    assert_eq!(request.params.rfluxmax, ParamValue::Number(27.0));
    assert_eq!(request.settings.rfluxunits, "mag");
    assert_eq!(request.settings.residplot, "No plot");
}

#[test]
fn test_config_overrides_target_defaults() {
    let config = WcsAlignConfig::from_yaml_str(
        "parameters:\n  threshold: 6.0\n  rfluxmax: 25\n",
    )
    .unwrap();
    let target = RegistrationTarget::ReferenceImage {
        refimage: "ref_drz.fits".into(),
        refcat: None,
    };
    let mut params = target.default_params();
    config.parameters.apply_to(&mut params);

    let store = SharedStore::with_camera(&["j01_flt.fits"], "ACS", "WFC");
    let mut engine = RecordingEngine::default();
    let mut console = LineConsole::new(&b""[..], Vec::new());
    let mut session = Session::new(
        store.clone(),
        &mut engine,
        &mut console,
        SessionOptions::default(),
    );
    let result = register(&mut session, &target, &"j01_flt.fits".into(), params).unwrap();

    assert_eq!(result.params.threshold, ParamValue::Number(6.0));
    assert_eq!(result.params.rfluxmax, ParamValue::Number(25.0));
    assert_eq!(result.params.rfluxmin, ParamValue::Number(18.0));
}

#[test]
fn test_config_null_unsets_target_default() {
    let config = WcsAlignConfig::from_yaml_str("parameters:\n  rfluxmin: null\n").unwrap();
    let target = RegistrationTarget::ReferenceImage {
        refimage: "ref_drz.fits".into(),
        refcat: None,
    };
    let mut params = target.default_params();
    assert_eq!(params.rfluxmin, ParamValue::Number(18.0));

    config.parameters.apply_to(&mut params);

    assert_eq!(params.rfluxmin, ParamValue::Unset);
    assert_eq!(params.rfluxmax, ParamValue::Number(27.0));
}

#[test]
fn test_glob_input_resolves_first_file() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap();
    let first = dir.join("j01_flt.fits");
    std::fs::write(&first, b"").unwrap();
    std::fs::write(dir.join("j02_flt.fits"), b"").unwrap();

    let store = SharedStore::with_camera(&[first.as_str()], "WFC3", "UVIS");
    let mut engine = RecordingEngine::default();
    let mut console = LineConsole::new(&b""[..], Vec::new());
    let mut session = Session::new(
        store.clone(),
        &mut engine,
        &mut console,
        SessionOptions::default(),
    );

    let pattern = dir.join("*_flt.fits").to_string();
    let result = to_first_image(&mut session, &pattern.into()).unwrap();
    drop(session);

    assert_eq!(result.wcsname, "FIRSTIM:j01_flt.fits");
    assert_eq!(engine.requests[0].files[0], first);
}

#[test]
fn test_empty_input() {
    let store = SharedStore::default();
    let mut engine = RecordingEngine::default();
    let mut console = LineConsole::new(&b""[..], Vec::new());
    let mut session = Session::new(
        store,
        &mut engine,
        &mut console,
        SessionOptions::default(),
    );

    let err = intra_visit(&mut session, &FileInput::List(Vec::new())).unwrap_err();
    assert_eq!(err, WcsAlignError::EmptyFileList(String::new()));
}
