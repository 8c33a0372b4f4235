use super::expressions::Context;
use super::fragment::Fragment;
use super::Printer;
use luamin_parser::ast::*;

impl Printer<'_> {
    pub fn print_statement(&mut self, statement: &Statement) -> Fragment {
        let mut fragment = self.node(statement.position);
        match &statement.kind {
            StatementKind::Assignment { targets, values } => {
                let targets = self.print_expression_list(targets);
                let values = self.print_expression_list(values);
                fragment.append(targets).join("=").join(values);
            }
            StatementKind::Local { names, values } => {
                let names = self.print_list(names, |printer, name| printer.print_identifier(name));
                fragment.append("local").join(names);
                if !values.is_empty() {
                    let values = self.print_expression_list(values);
                    fragment.join("=").join(values);
                }
            }
            StatementKind::Call(expression) => {
                let call = self.print_expression(expression, Context::default());
                fragment.append(call);
            }
            StatementKind::If(clauses) => {
                for clause in clauses {
                    let clause = self.print_if_clause(clause);
                    fragment.join(clause);
                }
                fragment.join("end");
            }
            StatementKind::While { condition, body } => {
                let condition = self.print_expression(condition, Context::default());
                let body = self.print_block(body);
                fragment
                    .append("while")
                    .join(condition)
                    .join("do")
                    .join(body)
                    .join("end");
            }
            StatementKind::Do(body) => {
                let body = self.print_block(body);
                fragment.append("do").join(body).join("end");
            }
            StatementKind::Return(values) => {
                fragment.append("return");
                if !values.is_empty() {
                    let values = self.print_expression_list(values);
                    fragment.join(values);
                }
            }
            StatementKind::Break => {
                fragment.append("break");
            }
            StatementKind::Repeat { body, condition } => {
                let body = self.print_block(body);
                let condition = self.print_expression(condition, Context::default());
                fragment
                    .append("repeat")
                    .join(body)
                    .join("until")
                    .join(condition);
            }
            StatementKind::Function(declaration) => {
                if declaration.is_local {
                    fragment.append("local").join("function");
                } else {
                    fragment.append("function");
                }
                if let Some(name) = &declaration.name {
                    let name = self.print_expression(name, Context::default());
                    fragment.join(name);
                }
                let body = self.print_function_body(declaration);
                fragment.join(body);
            }
            StatementKind::ForNumeric {
                variable,
                start,
                limit,
                step,
                body,
            } => {
                let variable = self.print_identifier(variable);
                let start = self.print_expression(start, Context::default());
                let limit = self.print_expression(limit, Context::default());
                fragment
                    .append("for")
                    .join(variable)
                    .join("=")
                    .join(start)
                    .join(",")
                    .join(limit);
                if let Some(step) = step {
                    let step = self.print_expression(step, Context::default());
                    fragment.join(",").join(step);
                }
                let body = self.print_block(body);
                fragment.join("do").join(body).join("end");
            }
            StatementKind::ForGeneric {
                variables,
                iterators,
                body,
            } => {
                let variables =
                    self.print_list(variables, |printer, name| printer.print_identifier(name));
                let iterators = self.print_expression_list(iterators);
                let body = self.print_block(body);
                fragment
                    .append("for")
                    .join(variables)
                    .join("in")
                    .join(iterators)
                    .join("do")
                    .join(body)
                    .join("end");
            }
            StatementKind::Label(name) => {
                fragment.append(format!("::{}::", name.value));
            }
            StatementKind::Goto(name) => {
                fragment.append("goto").join(name.value.as_str());
            }
        }
        fragment
    }

    fn print_if_clause(&mut self, clause: &IfClause) -> Fragment {
        let mut fragment = self.node(clause.position);
        let keyword = match clause.kind {
            ClauseKind::If => "if",
            ClauseKind::ElseIf => "elseif",
            ClauseKind::Else => "else",
        };
        fragment.append(keyword);
        if let Some(condition) = &clause.condition {
            let condition = self.print_expression(condition, Context::default());
            fragment.join(condition).join("then");
        }
        let body = self.print_block(&clause.body);
        fragment.join(body);
        fragment
    }

    /// `(params)body end`, shared by function statements and expressions.
    pub(super) fn print_function_body(&mut self, declaration: &FunctionDeclaration) -> Fragment {
        let mut fragment = Fragment::new();
        let parameters = self.print_list(&declaration.parameters, |printer, parameter| {
            match parameter {
                Parameter::Name(identifier) => printer.print_identifier(identifier),
                Parameter::Vararg(position) => {
                    let mut vararg = printer.node(*position);
                    vararg.append("...");
                    vararg
                }
            }
        });
        let body = self.print_block(&declaration.body);
        fragment
            .append("(")
            .append(parameters)
            .append(")")
            .join(body)
            .join("end");
        fragment
    }
}

#[cfg(test)]
mod tests {
    use crate::codegen::Printer;
    use crate::minifier::MinifySession;
    use indoc::indoc;

    fn minify(source: &str) -> String {
        let chunk = luamin_parser::parse(source).unwrap();
        let mut session = MinifySession::with_reserved(&chunk.globals);
        Printer::new(&mut session, "main")
            .print_chunk(&chunk)
            .to_string()
    }

    #[test]
    fn test_local_and_assignment() {
        assert_eq!(minify("local x, y = 1, 2"), "local a,b=1,2");
        assert_eq!(minify("local x\nx = 3"), "local a a=3");
        assert_eq!(minify("t.x, t[1] = 1, 2"), "t.x,t[1]=1,2");
    }

    #[test]
    fn test_if_clauses_share_one_end() {
        let source = indoc! {"
            if a then
              f()
            elseif b then
              g()
            else
              h()
            end
        "};
        assert_eq!(minify(source), "if a then f()elseif b then g()else h()end");
    }

    #[test]
    fn test_loops() {
        assert_eq!(
            minify("for i = 1, 10 do print(i) end"),
            "for a=1,10 do print(a)end"
        );
        assert_eq!(
            minify("for i = 10, 1, -1 do end"),
            "for a=10,1,-1 do end"
        );
        assert_eq!(
            minify("for k, v in pairs(t) do print(k, v) end"),
            "for a,b in pairs(t)do print(a,b)end"
        );
        assert_eq!(minify("while x do break end"), "while x do break end");
        assert_eq!(
            minify("local n = 0 repeat n = n + 1 until n > 3"),
            "local a=0 repeat a=a+1 until a>3"
        );
        assert_eq!(minify("do local x = 1 end"), "do local a=1 end");
    }

    #[test]
    fn test_function_statements() {
        assert_eq!(
            minify("local function add(a, b) return a + b end"),
            "local function a(b,c)return b+c end"
        );
        assert_eq!(
            minify("function M.greet(name) return 'hi ' .. name end"),
            "function M.greet(a)return'hi '..a end"
        );
        assert_eq!(
            minify("function obj:method(x) return self.value + x end"),
            "function obj:method(a)return self.value+a end"
        );
        assert_eq!(minify("function f(...) end"), "function f(...)end");
    }

    #[test]
    fn test_labels_and_goto() {
        assert_eq!(minify("goto skip\n::skip::"), "goto skip::skip::");
    }

    #[test]
    fn test_return_forms() {
        assert_eq!(minify("return"), "return");
        assert_eq!(minify("return 1, 2"), "return 1,2");
        assert_eq!(minify("return {}"), "return{}");
    }

    #[test]
    fn test_comments_are_dropped() {
        assert_eq!(minify("-- remove me\nlocal x = 1 --[[ gone ]]"), "local a=1");
    }
}
