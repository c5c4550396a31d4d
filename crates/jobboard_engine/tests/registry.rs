use jobboard_engine::{
    SourceAdapter, SourceError, SourceRegistry, SourceSettings, JOBICY, REMOTEOK,
};

#[test]
fn builtin_boards_are_registered() {
    let registry = SourceRegistry::with_builtin();
    assert_eq!(registry.names(), vec!["jobicy", "remoteok"]);

    let remoteok = registry
        .create("remoteok", &SourceSettings::enabled())
        .unwrap();
    assert_eq!(remoteok.name(), REMOTEOK);
    let jobicy = registry.create("jobicy", &SourceSettings::enabled()).unwrap();
    assert_eq!(jobicy.name(), JOBICY);
}

#[test]
fn lookup_ignores_case_and_surrounding_space() {
    let registry = SourceRegistry::default();
    assert!(registry.contains(" RemoteOK "));
    assert!(registry.create("JOBICY", &SourceSettings::enabled()).is_ok());
}

#[test]
fn unknown_name_is_rejected() {
    let registry = SourceRegistry::with_builtin();
    let err = registry
        .create("jooble", &SourceSettings::enabled())
        .err()
        .expect("unknown source");
    assert!(matches!(err, SourceError::UnknownSource(name) if name == "jooble"));
}

#[test]
fn invalid_settings_fail_construction() {
    let registry = SourceRegistry::with_builtin();

    let bad_url = SourceSettings {
        url: Some("not a url".to_string()),
        ..SourceSettings::enabled()
    };
    let err = registry.create("jobicy", &bad_url).err().unwrap();
    assert!(matches!(err, SourceError::Configuration { .. }));

    let bad_timeout = SourceSettings {
        timeout: 0.0,
        ..SourceSettings::enabled()
    };
    let err = registry.create("remoteok", &bad_timeout).err().unwrap();
    assert!(matches!(err, SourceError::Configuration { .. }));
}

#[test]
fn custom_boards_can_be_registered() {
    fn build(settings: &SourceSettings) -> Result<Box<dyn SourceAdapter>, SourceError> {
        let adapter = jobboard_engine::JobicyAdapter::new(settings)?;
        Ok(Box::new(adapter))
    }

    let mut registry = SourceRegistry::empty();
    assert!(!registry.contains("mirror"));
    registry.register("Mirror", build);
    assert_eq!(registry.names(), vec!["mirror"]);
    assert!(registry.create("mirror", &SourceSettings::enabled()).is_ok());
}
