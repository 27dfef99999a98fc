use envbind::{EnvOptions, Load, define_env};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

define_env! {
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ServerEnv {
        #[env(key = "ENVBIND_OVERRIDE_HOST")]
        pub host: String,

        #[env(key = "ENVBIND_OVERRIDE_PORT", min = 1, max = 65535)]
        pub port: u16,
    }
}

#[test]
fn test_process_env_overrides_file() {
    temp_env::with_var("ENVBIND_OVERRIDE_HOST", Some("from-process"), || {
        let result =
            ServerEnv::initialize(&EnvOptions::default(), Some(fixture("override-test.env").as_path()))
                .unwrap();
        assert!(!result.has_errors(), "{:?}", result.errors());

        assert_eq!(result.environment().host, "from-process");
        assert_eq!(result.environment().port, 8080);
    });
}

#[test]
fn test_file_wins_when_overrides_are_disabled() {
    temp_env::with_var("ENVBIND_OVERRIDE_HOST", Some("from-process"), || {
        let options = EnvOptions {
            process_env_overwrites: false,
            ..EnvOptions::default()
        };
        let result = ServerEnv::initialize(&options, Some(fixture("override-test.env").as_path()))
            .unwrap();

        assert_eq!(result.environment().host, "from-file");
    });
}

#[test]
fn test_empty_process_value_does_not_override() {
    temp_env::with_var("ENVBIND_OVERRIDE_PORT", Some(""), || {
        let result =
            ServerEnv::initialize(&EnvOptions::default(), Some(fixture("override-test.env").as_path()))
                .unwrap();

        assert_eq!(result.environment().port, 8080);
    });
}

#[test]
fn test_process_value_is_validated() {
    temp_env::with_var("ENVBIND_OVERRIDE_PORT", Some("70000"), || {
        let result =
            ServerEnv::initialize(&EnvOptions::default(), Some(fixture("override-test.env").as_path()))
                .unwrap();

        assert_eq!(result.errors().len(), 1);
        assert!(result.errors()[0].contains("maximum of 65535"));
    });
}
