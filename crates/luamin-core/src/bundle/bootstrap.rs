//! Loader emitted in front of a bundled entry module, and pragma comments.
//!
//! The loader shadows `require` with a local function that runs each
//! bundled module body at most once and caches its result:
//!
//! ```lua
//! local R,L=require
//! local function require(m)
//!   L=L or{}
//!   if L[m]~=nil then return L[m] end
//!   if m=="util" then
//!     L[m]=(function(...) --[[ body ]] end)(m)
//!     if L[m]==nil then L[m]=true end
//!     return L[m]
//!   end
//!   return R(m)
//! end
//! ```
//!
//! Names that are not bundled fall through to the host `require`.

use crate::codegen::Fragment;
use crate::minifier::MinifySession;
use luamin_parser::ast::Comment;

/// Comments whose body starts with `marker`, in source order.
pub fn pragma_comments<'c>(comments: &'c [Comment], marker: &str) -> Vec<&'c Comment> {
    if marker.is_empty() {
        return Vec::new();
    }
    comments
        .iter()
        .filter(|comment| comment.value.starts_with(marker))
        .collect()
}

/// Prepend each pragma verbatim on its own line, keeping source order.
pub fn prepend_pragmas(output: &mut Fragment, pragmas: &[&Comment], module: &str) {
    for comment in pragmas.iter().rev() {
        let mut line = Fragment::with_origin(module.into(), comment.position);
        line.append(comment.raw.as_str()).append("\n");
        output.prepend(line);
    }
}

/// Lua string literal for a module name.
fn quote(name: &str) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for c in name.chars() {
        match c {
            '\\' | '"' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Build the loader for `modules` (name and printed body, entry excluded).
///
/// Helper names are drawn from `session` after every module body has been
/// printed, so they cannot clash with any renamed local.
pub fn dispatcher(session: &mut MinifySession, modules: Vec<(String, Fragment)>) -> Fragment {
    let host = session.fresh_name();
    let loaded = session.fresh_name();
    let name = session.fresh_name();
    let slot = format!("{}[{}]", loaded, name);

    let mut fragment = Fragment::new();
    fragment
        .append("local")
        .join(format!("{},{}=require", host, loaded))
        .join("local")
        .join("function")
        .join(format!("require({})", name))
        .join(format!("{}={} or{{}}", loaded, loaded))
        .join("if")
        .join(format!("{}~=nil", slot))
        .join("then")
        .join("return")
        .join(slot.as_str())
        .join("end");

    for (module, body) in modules {
        fragment
            .join("if")
            .join(format!("{}=={}", name, quote(&module)))
            .join("then")
            .join(format!("{}=(function(...)", slot))
            .join(body)
            .join(format!("end)({})", name))
            .join("if")
            .join(format!("{}==nil", slot))
            .join("then")
            .join(format!("{}=true", slot))
            .join("end")
            .join("return")
            .join(slot.as_str())
            .join("end");
    }

    fragment
        .join("return")
        .join(format!("{}({})", host, name))
        .join("end");
    fragment
}

#[cfg(test)]
mod tests {
    use super::*;
    use luamin_parser::SourcePosition;

    fn comment(raw: &str, value: &str, line: u32) -> Comment {
        Comment {
            raw: raw.to_string(),
            value: value.to_string(),
            position: SourcePosition::new(line, 0),
        }
    }

    #[test]
    fn test_pragma_filter() {
        let comments = vec![
            comment("--#keep: notice", "#keep: notice", 1),
            comment("-- remove me", " remove me", 2),
            comment("--#second", "#second", 3),
        ];
        let pragmas = pragma_comments(&comments, "#");
        assert_eq!(pragmas.len(), 2);
        assert_eq!(pragmas[0].raw, "--#keep: notice");
        assert!(pragma_comments(&comments, "").is_empty());
    }

    #[test]
    fn test_prepend_keeps_order() {
        let comments = vec![comment("--#a", "#a", 1), comment("--#b", "#b", 2)];
        let pragmas = pragma_comments(&comments, "#");
        let mut output = Fragment::text("x=1");
        prepend_pragmas(&mut output, &pragmas, "main");
        assert_eq!(output.to_string(), "--#a\n--#b\nx=1");
    }

    #[test]
    fn test_dispatcher_shape() {
        let mut session = MinifySession::new();
        let loader = dispatcher(
            &mut session,
            vec![("util".to_string(), Fragment::text("return 1"))],
        );
        assert_eq!(
            loader.to_string(),
            "local a,b=require local function require(c)b=b or{}if b[c]~=nil then return b[c]end \
             if c==\"util\"then b[c]=(function(...)return 1 end)(c)if b[c]==nil then b[c]=true end \
             return b[c]end return a(c)end"
        );
    }

    #[test]
    fn test_dispatcher_without_modules() {
        let mut session = MinifySession::with_reserved(["a"]);
        let loader = dispatcher(&mut session, Vec::new());
        assert_eq!(
            loader.to_string(),
            "local b,c=require local function require(d)c=c or{}if c[d]~=nil then return c[d]end return b(d)end"
        );
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("a.b"), "\"a.b\"");
        assert_eq!(quote("a\"b"), "\"a\\\"b\"");
    }
}
