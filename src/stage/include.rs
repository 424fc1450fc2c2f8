//! Include preprocessor.
//!
//! Expands `{prefix}include('path'[, {params}])` directives and substitutes
//! `{prefix}name` / `{prefix}a.b` variables from a JSON context. With the
//! default `@@` prefix:
//!
//! ```html
//! <html lang="@@language">
//! @@include('./partials/header.html', { "title": "About", nav: { active: "about" } })
//! ```
//!
//! Parameters are merged over the caller's context for the included file.

use crate::config::IncludeBase;
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

/// Maximum include nesting.
pub const MAX_DEPTH: usize = 32;

/// Object keys written without quotes (`{ title: "x" }`).
static BARE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([{,]\s*)([A-Za-z_]\w*)\s*:").unwrap());

#[derive(Debug, Error)]
pub enum IncludeError {
    #[error("failed to read `{0}`")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("{file}: included file `{target}` not found")]
    NotFound { file: PathBuf, target: PathBuf },

    #[error("include cycle: {}", format_chain(.0))]
    Cycle(Vec<PathBuf>),

    #[error("{0}: includes nested deeper than {MAX_DEPTH} levels")]
    TooDeep(PathBuf),

    #[error("{file}: malformed include directive: {detail}")]
    Syntax { file: PathBuf, detail: String },

    #[error("{file}: include parameters are not a JSON object")]
    Params {
        file: PathBuf,
        #[source]
        source: Option<serde_json::Error>,
    },
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Settings for one preprocessing call.
#[derive(Debug, Clone)]
pub struct IncludeOptions {
    /// Marker token, `@@` by default.
    pub prefix: String,
    pub base: IncludeBase,
    /// Variables visible to the document.
    pub context: Map<String, Value>,
}

/// Template-inclusion collaborator: reads `source` and returns the
/// expanded text.
pub trait IncludeProcessor: Send + Sync {
    fn process(&self, source: &Path, options: &IncludeOptions) -> Result<String, IncludeError>;
}

/// Built-in file-based processor.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileInclude;

impl IncludeProcessor for FileInclude {
    fn process(&self, source: &Path, options: &IncludeOptions) -> Result<String, IncludeError> {
        let variables = variable_pattern(&options.prefix);
        let mut expander = Expander {
            options,
            variables: &variables,
            stack: Vec::new(),
        };
        expander.expand(source, &options.context)
    }
}

fn variable_pattern(prefix: &str) -> Regex {
    let pattern = format!(r"{}([A-Za-z_]\w*(?:\.[A-Za-z_]\w*)*)", regex::escape(prefix));
    // Escaped literal plus a fixed tail always compiles.
    Regex::new(&pattern).unwrap_or_else(|_| unreachable!("invalid variable pattern {pattern}"))
}

struct Expander<'a> {
    options: &'a IncludeOptions,
    variables: &'a Regex,
    /// Files currently being expanded, outermost first.
    stack: Vec<PathBuf>,
}

impl Expander<'_> {
    fn expand(&mut self, file: &Path, context: &Map<String, Value>) -> Result<String, IncludeError> {
        if self.stack.iter().any(|p| p == file) {
            let mut chain = self.stack.clone();
            chain.push(file.to_path_buf());
            return Err(IncludeError::Cycle(chain));
        }
        if self.stack.len() >= MAX_DEPTH {
            return Err(IncludeError::TooDeep(file.to_path_buf()));
        }

        let text = std::fs::read_to_string(file)
            .map_err(|e| IncludeError::Read(file.to_path_buf(), e))?;
        self.stack.push(file.to_path_buf());

        let directive = format!("{}include(", self.options.prefix);
        let mut out = String::with_capacity(text.len());
        let mut rest = text.as_str();

        while let Some(start) = rest.find(&directive) {
            out.push_str(&self.substitute(&rest[..start], context));
            let args_start = start + directive.len();
            let (call, consumed) = parse_call(&rest[args_start..]).map_err(|detail| {
                IncludeError::Syntax {
                    file: file.to_path_buf(),
                    detail,
                }
            })?;

            let target = self.resolve(file, &call.path);
            if !target.is_file() {
                return Err(IncludeError::NotFound {
                    file: file.to_path_buf(),
                    target,
                });
            }

            let merged = match call.params {
                Some(raw) => {
                    let mut merged = context.clone();
                    merged.extend(parse_params(&raw, file)?);
                    merged
                }
                None => context.clone(),
            };
            out.push_str(&self.expand(&target, &merged)?);
            rest = &rest[args_start + consumed..];
        }
        out.push_str(&self.substitute(rest, context));

        self.stack.pop();
        Ok(out)
    }

    fn resolve(&self, including: &Path, target: &str) -> PathBuf {
        let base = match &self.options.base {
            IncludeBase::File => including.parent().unwrap_or(Path::new("")),
            IncludeBase::Dir(dir) => dir.as_path(),
        };
        crate::utils::path::clean_join(base, target)
    }

    /// Replace known variables; unknown ones stay verbatim.
    fn substitute(&self, text: &str, context: &Map<String, Value>) -> String {
        self.variables
            .replace_all(text, |caps: &Captures<'_>| {
                lookup(context, &caps[1])
                    .map(render)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

fn lookup<'v>(context: &'v Map<String, Value>, dotted: &str) -> Option<&'v Value> {
    let mut parts = dotted.split('.');
    let mut value = context.get(parts.next()?)?;
    for part in parts {
        value = value.as_object()?.get(part)?;
    }
    Some(value)
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn parse_params(raw: &str, file: &Path) -> Result<Map<String, Value>, IncludeError> {
    let value = match serde_json::from_str::<Value>(raw) {
        Ok(value) => value,
        Err(first) => {
            let quoted = BARE_KEY.replace_all(raw, r#"${1}"${2}":"#);
            serde_json::from_str::<Value>(&quoted).map_err(|_| IncludeError::Params {
                file: file.to_path_buf(),
                source: Some(first),
            })?
        }
    };
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(IncludeError::Params {
            file: file.to_path_buf(),
            source: None,
        }),
    }
}

/// Arguments of one directive.
struct Call {
    path: String,
    params: Option<String>,
}

/// Parse `'path'[, {...}])` and return the call plus bytes consumed
/// (through the closing parenthesis).
fn parse_call(input: &str) -> Result<(Call, usize), String> {
    let mut pos = skip_ws(input, 0);
    let quote = input[pos..]
        .chars()
        .next()
        .filter(|c| matches!(c, '\'' | '"'))
        .ok_or("expected a quoted path")?;
    pos += 1;
    let len = input[pos..]
        .find(quote)
        .ok_or("unterminated path string")?;
    let path = input[pos..pos + len].to_string();
    pos = skip_ws(input, pos + len + 1);

    let mut params = None;
    if input[pos..].starts_with(',') {
        pos = skip_ws(input, pos + 1);
        if !input[pos..].starts_with('{') {
            return Err("expected `{` after `,`".into());
        }
        let len = balanced_object(&input[pos..]).ok_or("unbalanced parameter object")?;
        params = Some(input[pos..pos + len].to_string());
        pos = skip_ws(input, pos + len);
    }

    if !input[pos..].starts_with(')') {
        return Err("expected `)`".into());
    }
    Ok((Call { path, params }, pos + 1))
}

fn skip_ws(input: &str, pos: usize) -> usize {
    pos + input[pos..].len() - input[pos..].trim_start().len()
}

/// Byte length of the `{...}` object at the start of `input`, honoring
/// quoted strings.
fn balanced_object(input: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string: Option<char> = None;
    let mut escaped = false;

    for (i, c) in input.char_indices() {
        if let Some(q) = in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                in_string = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => in_string = Some(c),
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}
