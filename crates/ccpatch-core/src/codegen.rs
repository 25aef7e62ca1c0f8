//! Source generation
//!
//! Nodes parsed from the input are printed by copying their source span and
//! splicing in the printed form of each child, so untouched code comes out
//! byte-for-byte identical. Nodes built or restructured by a rule are printed
//! from their structure in a compact canonical form.

use crate::parser::literals::quote;
use crate::tree::{Node, NodeId, Origin, SyntaxTree};

/// Print `tree` back to JavaScript source
pub fn generate(tree: &SyntaxTree) -> String {
    let mut generator = Generator {
        tree,
        out: String::with_capacity(tree.source().len()),
    };
    generator.emit(tree.root());
    generator.out
}

struct Generator<'t> {
    tree: &'t SyntaxTree,
    out: String,
}

impl Generator<'_> {
    fn emit(&mut self, id: NodeId) {
        match self.tree.origin(id) {
            Origin::Source => self.emit_source(id),
            Origin::Synthetic => self.emit_synthetic(id),
        }
    }

    fn emit_source(&mut self, id: NodeId) {
        let source = self.tree.source();
        let span = self.tree.span(id);
        let mut cursor = span.start;
        for child in self.tree.node(id).children() {
            let child_span = self.tree.span(child);
            let start = child_span.start.max(cursor);
            self.out.push_str(&source[cursor..start]);
            let mark = self.out.len();
            self.emit(child);
            if self.tree.origin(child) == Origin::Synthetic
                && self.tree.starts_statement(child_span.start)
            {
                self.guard_statement_start(mark);
            }
            cursor = child_span.end.max(cursor);
        }
        self.out.push_str(&source[cursor..span.end.max(cursor)]);
    }

    /// Keep a statement printed from `mark` on from continuing the previous line
    fn guard_statement_start(&mut self, mark: usize) {
        if !self.out[mark..].starts_with(['[', '(']) {
            return;
        }
        let terminated = matches!(
            self.out[..mark].trim_end().chars().last(),
            None | Some(';') | Some('{')
        );
        if !terminated {
            self.out.insert(mark, ';');
        }
    }

    fn emit_list(&mut self, items: &[NodeId], separator: &str) {
        for (index, item) in items.iter().enumerate() {
            if index > 0 {
                self.out.push_str(separator);
            }
            self.emit(*item);
        }
    }

    fn emit_synthetic(&mut self, id: NodeId) {
        match self.tree.node(id) {
            Node::Program { body } => self.emit_list(body, "\n"),
            Node::Function { name, params, body } => {
                self.out.push_str("function");
                if let Some(name) = name {
                    self.out.push(' ');
                    self.out.push_str(name);
                }
                self.out.push('(');
                self.emit_list(params, ", ");
                self.out.push_str(") ");
                self.emit(*body);
            }
            Node::Block { statements } => {
                if statements.is_empty() {
                    self.out.push_str("{}");
                } else {
                    self.out.push_str("{ ");
                    self.emit_list(statements, " ");
                    self.out.push_str(" }");
                }
            }
            Node::ReturnStatement { argument } => {
                self.out.push_str("return");
                if let Some(argument) = argument {
                    self.out.push(' ');
                    self.emit(*argument);
                }
                self.out.push(';');
            }
            Node::CallExpression { callee, arguments } => {
                self.emit(*callee);
                self.out.push('(');
                self.emit_list(arguments, ", ");
                self.out.push(')');
            }
            Node::MemberExpression { object, property } => {
                self.emit(*object);
                self.out.push('.');
                self.out.push_str(property);
            }
            Node::ArrayExpression { elements } => {
                self.out.push('[');
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        self.out.push_str(", ");
                    }
                    if let Some(element) = element {
                        self.emit(*element);
                    }
                }
                // A trailing hole needs its own comma to survive
                if matches!(elements.last(), Some(None)) {
                    self.out.push(',');
                }
                self.out.push(']');
            }
            Node::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => {
                self.emit(*test);
                self.out.push_str(" ? ");
                self.emit(*consequent);
                self.out.push_str(" : ");
                self.emit(*alternate);
            }
            Node::ObjectExpression { properties } => {
                if properties.is_empty() {
                    self.out.push_str("{}");
                    return;
                }
                self.out.push_str("{ ");
                for (index, property) in properties.iter().enumerate() {
                    if index > 0 {
                        self.out.push_str(", ");
                    }
                    if is_identifier(&property.key) {
                        self.out.push_str(&property.key);
                    } else {
                        self.out.push_str(&quote(&property.key));
                    }
                    self.out.push_str(": ");
                    self.emit(property.value);
                }
                self.out.push_str(" }");
            }
            Node::Parenthesized { expression } => {
                self.out.push('(');
                self.emit(*expression);
                self.out.push(')');
            }
            Node::StringLiteral { value } => self.out.push_str(&quote(value)),
            Node::NullLiteral => self.out.push_str("null"),
            Node::BooleanLiteral { value } => {
                self.out.push_str(if *value { "true" } else { "false" })
            }
            // Opaque regions have no structure of their own to print
            Node::Opaque { .. } => self.emit_source(id),
        }
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::tree::Property;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("var a = 1;")]
    #[case("f(\"x\", [1, , 2], c ? [a] : (b));\n// trailing comment\n")]
    #[case("function f(a, b = \"d\") {\n  return a.b(\"s\");\n}\n")]
    #[case("const s = 'single \\' quote';")]
    fn test_untouched_tree_round_trips(#[case] source: &str) {
        let tree = parse(source).unwrap();
        assert_eq!(generate(&tree), source);
    }

    #[test]
    fn test_replaced_literal_is_spliced() {
        let source = "log('a', \"b\");";
        let mut tree = parse(source).unwrap();
        let mut stack = vec![tree.root()];
        let mut target = None;
        while let Some(id) = stack.pop() {
            if tree.string_value(id) == Some("a") {
                target = Some(id);
            }
            stack.extend(tree.node(id).children());
        }
        let empty = tree.string_literal("");
        tree.replace(target.unwrap(), empty);
        assert_eq!(generate(&tree), "log(\"\", \"b\");");
    }

    #[test]
    fn test_synthetic_shapes() {
        let mut tree = parse("").unwrap();
        let yes = tree.boolean_literal(true);
        let object = tree.object(vec![Property::new("valid", yes), Property::new("a-b", yes)]);
        let statement = tree.return_statement(Some(object));
        let block = tree.alloc(Node::Block {
            statements: vec![statement],
        });
        let null = tree.null_literal();
        let holes = tree.alloc(Node::ArrayExpression {
            elements: vec![Some(null), None],
        });
        let program = tree.alloc(Node::Program {
            body: vec![block, holes],
        });
        tree.replace(tree.root(), program);

        assert_eq!(
            generate(&tree),
            "{ return { valid: true, \"a-b\": true }; }\n[null, ,]"
        );
    }

    #[rstest]
    #[case("valid", true)]
    #[case("_x$1", true)]
    #[case("1abc", false)]
    #[case("a-b", false)]
    #[case("", false)]
    fn test_is_identifier(#[case] key: &str, #[case] expected: bool) {
        assert_eq!(is_identifier(key), expected);
    }
}
