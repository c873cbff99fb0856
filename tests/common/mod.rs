#![allow(dead_code, unused_imports)]

pub use cacher_test_utils::builders;
pub use cacher_test_utils::fake_backend;
pub use cacher_test_utils::init_tracing;

use std::path::{Path, PathBuf};

/// Write an executable shell script (unix only).
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A fake pull tool that appends `<cwd>|<cache env>|<XDG_RUNTIME_DIR or unset>|<args>`
/// to `log` and succeeds.
#[cfg(unix)]
pub fn recording_tool(dir: &Path, log: &Path) -> PathBuf {
    write_script(
        dir,
        "singularity",
        &format!(
            r#"echo "$(pwd -P)|${{SINGULARITY_CACHEDIR}}|${{XDG_RUNTIME_DIR-unset}}|$*" >> '{}'"#,
            log.display()
        ),
    )
}

/// A fake pull tool that fails its first `fail_times` invocations, counting
/// them in `counter`.
#[cfg(unix)]
pub fn flaky_tool(dir: &Path, counter: &Path, fail_times: u32) -> PathBuf {
    write_script(
        dir,
        "singularity",
        &format!(
            r#"n=$(cat '{c}' 2>/dev/null || echo 0)
n=$((n + 1))
echo "$n" > '{c}'
[ "$n" -gt {fail_times} ]"#,
            c = counter.display()
        ),
    )
}

/// A stand-in for a login shell with environment modules. It defines a
/// `module` function that logs its arguments to `log` and, for
/// `module load <module>`, prepends `bin` to `PATH`; then it runs the `-lc`
/// script with the remaining arguments.
#[cfg(unix)]
pub fn fake_module_shell(dir: &Path, log: &Path, module: &str, bin: &Path) -> PathBuf {
    write_script(
        dir,
        "modsh",
        &format!(
            r#"shift
script="$1"
shift
exec /bin/sh -c "module() {{ echo \"\$*\" >> '{log}'; if [ \"\$1\" = load ] && [ \"\$2\" = '{module}' ]; then PATH='{bin}':\$PATH; else return 1; fi; }}; $script" "$@""#,
            log = log.display(),
            bin = bin.display(),
        ),
    )
}

pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}
