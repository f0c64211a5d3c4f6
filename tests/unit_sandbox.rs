use excel_mcp::ExcelError;
use excel_mcp::sandbox;

mod support;

use support::TestWorkspace;

#[test]
fn rejects_paths_outside_the_workspace() {
    let workspace = TestWorkspace::new();
    let config = workspace.config();

    let outside = workspace
        .root()
        .parent()
        .expect("parent")
        .join("outside.xlsx");
    let err = sandbox::resolve(&config, outside.to_str().unwrap()).expect_err("outside");
    assert!(matches!(err, ExcelError::OutOfWorkspace { .. }), "{err}");
}

#[test]
fn rejects_sibling_directories_sharing_a_string_prefix() {
    // root /tmp/x/base must not admit /tmp/x/base2/f.xlsx
    let workspace = TestWorkspace::new();
    let base = workspace.path("base");
    let sibling = workspace.path("base2");
    std::fs::create_dir_all(&base).expect("mkdir");
    std::fs::create_dir_all(&sibling).expect("mkdir");

    let config = workspace.config_with(|cfg| {
        cfg.workspace_root = Some(base.clone());
    });

    let candidate = sibling.join("f.xlsx");
    let err = sandbox::resolve(&config, candidate.to_str().unwrap()).expect_err("sibling");
    assert!(matches!(err, ExcelError::OutOfWorkspace { .. }), "{err}");

    // while a genuinely nested path passes
    let nested = base.join("f.xlsx");
    sandbox::resolve(&config, nested.to_str().unwrap()).expect("nested path");
}

#[test]
fn rejects_dot_dot_traversal() {
    let workspace = TestWorkspace::new();
    let config = workspace.config();

    let err = sandbox::resolve(&config, "books/../../escape.xlsx").expect_err("traversal");
    assert!(matches!(err, ExcelError::OutOfWorkspace { .. }), "{err}");

    // `..` that stays inside the root is fine
    let resolved = sandbox::resolve(&config, "books/../demo.xlsx").expect("inside");
    assert_eq!(resolved, workspace.path("demo.xlsx"));
}

#[cfg(unix)]
#[test]
fn rejects_symlinks_that_point_outside() {
    let workspace = TestWorkspace::new();
    let base = workspace.path("base");
    std::fs::create_dir_all(&base).expect("mkdir");
    let elsewhere = workspace.path("elsewhere");
    std::fs::create_dir_all(&elsewhere).expect("mkdir");
    std::fs::write(elsewhere.join("secret.xlsx"), b"x").expect("write");
    std::os::unix::fs::symlink(&elsewhere, base.join("link")).expect("symlink");

    let config = workspace.config_with(|cfg| {
        cfg.workspace_root = Some(base.clone());
    });

    let err = sandbox::resolve(&config, "link/secret.xlsx").expect_err("symlink escape");
    assert!(matches!(err, ExcelError::OutOfWorkspace { .. }), "{err}");
}

#[test]
fn rejects_unsupported_extensions_case_insensitively() {
    let workspace = TestWorkspace::new();
    let config = workspace.config();

    for name in ["bad.xls", "bad.csv", "bad.txt", "bad", "bad.xlsx.bak"] {
        let err = sandbox::resolve(&config, name).expect_err(name);
        assert!(
            matches!(err, ExcelError::UnsupportedExtension { .. }),
            "{name}: {err}"
        );
    }

    sandbox::resolve(&config, "ok.XLSX").expect("uppercase xlsx");
    sandbox::resolve(&config, "ok.XlsM").expect("mixed-case xlsm");
}

#[test]
fn rejects_directories_with_workbook_extensions() {
    let workspace = TestWorkspace::new();
    let config = workspace.config();
    std::fs::create_dir_all(workspace.path("folder.xlsx")).expect("mkdir");

    let err = sandbox::resolve(&config, "folder.xlsx").expect_err("directory");
    assert!(matches!(err, ExcelError::PathIsDirectory { .. }), "{err}");
}

#[test]
fn relative_paths_resolve_against_the_workspace_root() {
    let workspace = TestWorkspace::new();
    let config = workspace.config();

    let resolved = sandbox::resolve(&config, "books/demo.xlsx").expect("resolve");
    assert_eq!(resolved, workspace.path("books/demo.xlsx"));

    let root = sandbox::workspace_root(&config).expect("root");
    assert_eq!(root, workspace.root());
}

#[test]
fn workspace_root_falls_back_to_cwd() {
    let config = excel_mcp::ServerConfig::default();
    let root = sandbox::workspace_root(&config).expect("root");
    let cwd = std::env::current_dir()
        .expect("cwd")
        .canonicalize()
        .expect("canonicalize");
    assert_eq!(root, cwd);
}

#[test]
fn root_configuration_is_read_per_call() {
    let workspace = TestWorkspace::new();
    let other = TestWorkspace::new();

    let mut config = workspace.config();
    sandbox::resolve(&config, "a.xlsx").expect("first root");

    // swapping the configured root redirects the very next call
    config.workspace_root = Some(other.root().to_path_buf());
    let resolved = sandbox::resolve(&config, "a.xlsx").expect("second root");
    assert_eq!(resolved, other.path("a.xlsx"));
}
