#![cfg(unix)]

use camino::Utf8Path;
use wcsalign::{
    bridge::BridgeCommand,
    catalog::{external::ExternalCatalogGenerator, make_source_catalog, CatalogParams},
    header::memory::MemoryHeaderStore,
    parameters::ParamValue,
    WcsAlignError,
};

fn uvis_store() -> MemoryHeaderStore {
    let mut store = MemoryHeaderStore::new();
    store.set_keyword("ib01_flt.fits", "INSTRUME", "WFC3");
    store.set_keyword("ib01_flt.fits", "DETECTOR", "UVIS");
    store
}

#[test]
fn test_bridge_sees_width_and_params() {
    // echo back the request fields as one source row
    let script = r#"req=$(cat)
case "$req" in
  *'"conv_width":3.5'*'"peakmax":40000.0'*) printf 'id,x,y,flux\n1,512.0,480.5,3100.0\n2,14.2,33.0,95.5\n' ;;
  *) echo "unexpected request: $req" >&2; exit 2 ;;
esac"#;
    let mut generator =
        ExternalCatalogGenerator::new(BridgeCommand::new("sh").with_args(["-c", script]));
    let params = CatalogParams {
        peakmax: ParamValue::Number(40000.0),
        ..Default::default()
    };

    let catalog = make_source_catalog(
        &mut uvis_store(),
        &mut generator,
        Utf8Path::new("ib01_flt.fits"),
        params,
    )
    .unwrap();

    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.image, "ib01_flt.fits");
    assert_eq!(catalog.sources[0].x, 512.0);

    let mut csv = Vec::new();
    catalog.write_csv(&mut csv).unwrap();
    let csv = String::from_utf8(csv).unwrap();
    assert!(csv.starts_with("id,x,y,flux\n1,512.0,480.5,3100.0\n"));
}

#[test]
fn test_bridge_failure() {
    let mut generator = ExternalCatalogGenerator::new(
        BridgeCommand::new("sh").with_args(["-c", "cat >/dev/null; echo 'no sources' >&2; exit 1"]),
    );

    let err = make_source_catalog(
        &mut uvis_store(),
        &mut generator,
        Utf8Path::new("ib01_flt.fits"),
        CatalogParams::default(),
    )
    .unwrap_err();

    match err {
        WcsAlignError::EngineFailed { stderr, .. } => assert_eq!(stderr, "no sources"),
        other => panic!("unexpected error: {other}"),
    }
}
