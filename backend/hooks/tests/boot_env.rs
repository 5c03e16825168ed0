use streamhook_config::{CONFIG_PATH_ENV_VAR, TRACE_ENV_VAR};
use streamhook_core::{Stage, StageKind};
use streamhook_hooks::{HookRegistry, intercept};

// Single test: the global registry reads the environment once per process.
#[test]
fn malformed_config_falls_back_to_defaults_with_env_overrides() {
    let dir = std::env::temp_dir().join(format!("streamhook-boot-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("hooks.yaml");
    std::fs::write(&path, "trace: [unclosed\n").unwrap();

    // SAFETY: the only test in this binary; nothing else reads the environment yet.
    unsafe {
        std::env::set_var(CONFIG_PATH_ENV_VAR, &path);
        std::env::set_var(TRACE_ENV_VAR, "TRUE");
    }

    assert!(HookRegistry::global().creation_hook().is_some());

    let stage = Stage::source("MultiRange", StageKind::multi());
    let traced = intercept(stage.clone()).unwrap();
    assert_eq!(traced.tag(), "MultiOnAssembly");
    assert!(traced.is_traced());
    assert!(traced.core().same_stage(&stage));

    let shared = Stage::source("MultiPublish", StageKind::multi().hot());
    assert!(intercept(shared.clone()).unwrap().same_stage(&shared));
}
