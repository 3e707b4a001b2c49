// File: tests/catalog_files.rs
// Editable catalog files: save, load, edit and pick up through settings.
use std::fs;
use zmanim_tags::catalog::Catalog;
use zmanim_tags::config::Settings;
use zmanim_tags::context::{AppContext, TestContext};
use zmanim_tags::error::CatalogError;
use zmanim_tags::model::{Jurisdiction, MappingRule, MatchKind, Tag};
use zmanim_tags::service::{ZmanimService, catalog_path};
use zmanim_tags::source::StaticCalendar;

#[test]
fn test_builtin_catalog_roundtrips_through_file() {
    let ctx = TestContext::new();
    let path = ctx.get_catalog_path().unwrap();

    let builtin = Catalog::builtin().unwrap();
    builtin.save(&path).unwrap();
    let loaded = Catalog::load(&path).unwrap();

    assert_eq!(loaded, builtin);
    assert_eq!(loaded.fingerprint(), builtin.fingerprint());
}

#[test]
fn test_edits_persist() {
    let ctx = TestContext::new();
    let path = ctx.get_catalog_path().unwrap();

    let mut catalog = Catalog::builtin().unwrap();
    catalog.upsert_tag(Tag::new("lag_baomer", "Lag BaOmer")).unwrap();
    catalog
        .upsert_rule(MappingRule::exact("lag_baomer", "Lag BaOmer"))
        .unwrap();
    catalog.remove_rule(MatchKind::Exact, "Shushan Purim").unwrap();
    catalog.save(&path).unwrap();

    let loaded = Catalog::load(&path).unwrap();
    assert!(loaded.tag("lag_baomer").is_some());
    assert!(
        loaded
            .rules
            .iter()
            .any(|r| r.tag == "lag_baomer" && r.kind == MatchKind::Exact)
    );
    assert!(!loaded.rules.iter().any(|r| r.pattern == "Shushan Purim"));
}

#[test]
fn test_rejected_edit_leaves_catalog_untouched() {
    let mut catalog = Catalog::builtin().unwrap();
    let before = catalog.clone();

    let err = catalog
        .upsert_rule(MappingRule::pattern("purim", "^Purim (", 0))
        .unwrap_err();
    assert!(matches!(err, CatalogError::InvalidPattern { .. }));

    let err = catalog.remove_tag("purim").unwrap_err();
    assert!(matches!(err, CatalogError::TagInUse { .. }));

    assert_eq!(catalog, before);
}

#[test]
fn test_invalid_file_is_reported() {
    let ctx = TestContext::new();
    let path = ctx.get_catalog_path().unwrap();
    fs::write(
        &path,
        r#"
[[tags]]
key = "purim"
names = { ashkenazi = "Purim" }

[[rules]]
tag = "purim"
kind = "pattern"
pattern = "^Purim ("
"#,
    )
    .unwrap();

    let err = Catalog::load(&path).unwrap_err();
    let text = format!("{:#}", err);
    assert!(text.contains("^Purim ("), "{}", text);
}

#[test]
fn test_settings_point_at_catalog_file() {
    let ctx = TestContext::new();
    let path = ctx.root.join("my-catalog.toml");

    let mut catalog = Catalog::builtin().unwrap();
    catalog
        .upsert_rule(MappingRule::exact("purim", "Purim Meshulash"))
        .unwrap();
    catalog.save(&path).unwrap();

    let settings = Settings {
        catalog_path: Some(path.clone()),
        ..Settings::default()
    };
    settings.save(&ctx).unwrap();
    let settings = Settings::load(&ctx).unwrap();

    assert_eq!(catalog_path(&settings, &ctx).unwrap(), Some(path));
    let svc = ZmanimService::from_settings(&settings, &ctx, StaticCalendar::new()).unwrap();
    assert_eq!(
        svc.resolve_name("Purim Meshulash", Jurisdiction::Israel)
            .unwrap()
            .tag_key,
        "purim"
    );
}

#[test]
fn test_no_catalog_file_means_builtin() {
    let ctx = TestContext::new();
    assert_eq!(catalog_path(&Settings::default(), &ctx).unwrap(), None);
}

#[test]
fn test_reload_from_file() {
    let ctx = TestContext::new();
    let path = ctx.get_catalog_path().unwrap();
    Catalog::builtin().unwrap().save(&path).unwrap();

    let svc = ZmanimService::from_settings(&Settings::default(), &ctx, StaticCalendar::new())
        .unwrap();
    assert!(
        svc.resolve_name("Purim Meshulash", Jurisdiction::Israel)
            .is_none()
    );

    let mut catalog = Catalog::load(&path).unwrap();
    catalog
        .upsert_rule(MappingRule::exact("purim", "Purim Meshulash"))
        .unwrap();
    catalog.save(&path).unwrap();

    svc.reload_from(&path).unwrap();
    assert!(
        svc.resolve_name("Purim Meshulash", Jurisdiction::Israel)
            .is_some()
    );

    // A broken file on disk does not disturb the running catalog.
    fs::write(&path, "[[tags]]\nkey = ").unwrap();
    assert!(svc.reload_from(&path).is_err());
    assert!(
        svc.resolve_name("Purim Meshulash", Jurisdiction::Israel)
            .is_some()
    );
}
