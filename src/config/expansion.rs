//! Template expansion for `worktree-path` and `post-create` commands.
//!
//! Uses minijinja. Paths are rendered with literal values; hook commands are
//! rendered with every interpolated value shell-escaped at output time, so
//! filters still see the raw value.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use minijinja::{Environment, UndefinedBehavior, Value};
use shell_escape::escape;

use crate::git::GitError;

/// Replace path separators so a branch name forms a single path component.
///
/// ```
/// use wtpr::config::sanitize_branch_name;
///
/// assert_eq!(sanitize_branch_name("feature/foo"), "feature-foo");
/// assert_eq!(sanitize_branch_name("user\\task"), "user-task");
/// ```
pub fn sanitize_branch_name(branch: &str) -> String {
    branch.replace(['/', '\\'], "-")
}

/// Expand `template` with `vars`.
///
/// With `shell_escape`, values are escaped for `sh -c`. `name` identifies the
/// template in errors and logs.
pub fn expand_template(
    template: &str,
    vars: &BTreeMap<&str, &str>,
    shell_escape: bool,
    name: &str,
) -> anyhow::Result<String> {
    let mut env = Environment::new();
    // Typos in variable names fail instead of rendering empty
    env.set_undefined_behavior(UndefinedBehavior::SemiStrict);
    if shell_escape {
        env.set_keep_trailing_newline(true);
        env.set_formatter(|out, _state, value| {
            if value.is_none() {
                return Ok(());
            }
            let s = value.to_string();
            write!(out, "{}", escape(Cow::Borrowed(s.as_str())))?;
            Ok(())
        });
    }
    env.add_filter("sanitize", |value: Value| -> String {
        sanitize_branch_name(value.as_str().unwrap_or_default())
    });

    log::debug!("[template:{name}] template={template:?} vars={vars:?}");

    let render_error = |e: minijinja::Error| GitError::ParseError(format!("{name}: {e}"));
    let tmpl = env
        .template_from_named_str(name, template)
        .map_err(render_error)?;
    let result = tmpl.render(Value::from_serialize(vars)).map_err(render_error)?;

    log::debug!("[template:{name}] result={result:?}");
    Ok(result)
}
