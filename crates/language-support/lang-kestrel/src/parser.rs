//! Error-tolerant parser building arena syntax trees
//!
//! The grammar is expression-oriented: a file is a sequence of `let`
//! bindings and expressions, expressions chain member accesses and calls
//! onto names, literals, and lambdas. A `<` directly after an identifier
//! always begins type arguments; Kestrel has no comparison operators, so
//! the choice never backtracks.
//!
//! Every lexed token lands in the tree exactly once, in source order, so
//! [`SyntaxTree::text`] reproduces the source even around parse errors.

use crate::lexer::{LexedToken, lex};
use ks_syntax::{SyntaxElement, SyntaxKind, SyntaxTree, TokenKind, TreeBuilder};

/// Parses `source` into a syntax tree
///
/// Always produces a tree: unexpected tokens are wrapped in error nodes
/// rather than failing the parse.
pub fn parse(source: &str) -> SyntaxTree {
    let parser = Parser {
        tokens: lex(source),
        pos: 0,
        builder: TreeBuilder::new(),
    };
    parser.file()
}

struct Parser {
    tokens: Vec<LexedToken>,
    pos: usize,
    builder: TreeBuilder,
}

impl Parser {
    fn file(mut self) -> SyntaxTree {
        let mut children = Vec::new();
        while self.pos < self.tokens.len() {
            children.push(self.statement());
        }
        let root = self.builder.node(SyntaxKind::Root, children);
        self.builder.finish(root)
    }

    fn statement(&mut self) -> SyntaxElement {
        if self.at_keyword("let") {
            let mut children = vec![self.bump()];
            if self.peek_kind() == Some(TokenKind::Ident) {
                children.push(self.simple_name());
            }
            if self.at_punct("=") {
                children.push(self.bump());
            }
            if self.pos < self.tokens.len() && !self.at_keyword("let") {
                children.push(self.expr());
            }
            SyntaxElement::Node(self.builder.node(SyntaxKind::Let, children))
        } else {
            self.expr()
        }
    }

    fn expr(&mut self) -> SyntaxElement {
        let mut current = self.primary();
        loop {
            if self.at_punct(".") {
                let dot = self.bump();
                let mut children = vec![current, dot];
                if self.peek_kind() == Some(TokenKind::Ident) {
                    children.push(self.name());
                }
                current = SyntaxElement::Node(self.builder.node(SyntaxKind::MemberAccess, children));
            } else if self.at_punct("(") {
                let args = self.arg_list();
                current =
                    SyntaxElement::Node(self.builder.node(SyntaxKind::Call, vec![current, args]));
            } else {
                break;
            }
        }
        current
    }

    fn primary(&mut self) -> SyntaxElement {
        match self.peek_kind() {
            Some(TokenKind::Ident) => self.name(),
            Some(TokenKind::Literal) => {
                let token = self.bump();
                SyntaxElement::Node(self.builder.node(SyntaxKind::Literal, vec![token]))
            }
            Some(TokenKind::Punct) if self.at_punct("|") => self.lambda(),
            Some(_) => self.bump_error(),
            None => SyntaxElement::Node(self.builder.node(SyntaxKind::Error, Vec::new())),
        }
    }

    /// `ident` or `ident<args>`
    fn name(&mut self) -> SyntaxElement {
        let ident = self.bump();
        if self.at_punct("<") {
            let args = self.type_args();
            SyntaxElement::Node(
                self.builder
                    .node(SyntaxKind::GenericName, vec![ident, args]),
            )
        } else {
            SyntaxElement::Node(self.builder.node(SyntaxKind::SimpleName, vec![ident]))
        }
    }

    /// `ident` with no type-argument lookahead, for binder positions
    fn simple_name(&mut self) -> SyntaxElement {
        let ident = self.bump();
        SyntaxElement::Node(self.builder.node(SyntaxKind::SimpleName, vec![ident]))
    }

    fn type_args(&mut self) -> SyntaxElement {
        let mut children = vec![self.bump()];
        loop {
            if self.at_punct(">") {
                children.push(self.bump());
                break;
            }
            match self.peek_kind() {
                Some(TokenKind::Ident) => children.push(self.name()),
                Some(TokenKind::Punct) if self.at_punct(",") => children.push(self.bump()),
                Some(_) => children.push(self.bump_error()),
                None => break,
            }
        }
        SyntaxElement::Node(self.builder.node(SyntaxKind::TypeArgs, children))
    }

    fn arg_list(&mut self) -> SyntaxElement {
        let mut children = vec![self.bump()];
        loop {
            if self.at_punct(")") {
                children.push(self.bump());
                break;
            }
            if self.pos >= self.tokens.len() {
                break;
            }
            if self.at_punct(",") {
                children.push(self.bump());
            } else {
                children.push(self.expr());
            }
        }
        SyntaxElement::Node(self.builder.node(SyntaxKind::ArgList, children))
    }

    fn lambda(&mut self) -> SyntaxElement {
        let params = self.param_list();
        let body = if self.pos < self.tokens.len() {
            self.expr()
        } else {
            SyntaxElement::Node(self.builder.node(SyntaxKind::Error, Vec::new()))
        };
        SyntaxElement::Node(self.builder.node(SyntaxKind::Lambda, vec![params, body]))
    }

    /// `|` params `|`; parameters stay bare tokens, they declare names
    /// rather than use them
    fn param_list(&mut self) -> SyntaxElement {
        let mut children = vec![self.bump()];
        loop {
            if self.at_punct("|") {
                children.push(self.bump());
                break;
            }
            match self.peek_kind() {
                Some(TokenKind::Ident) => children.push(self.bump()),
                Some(TokenKind::Punct) if self.at_punct(",") => children.push(self.bump()),
                Some(_) => children.push(self.bump_error()),
                None => break,
            }
        }
        SyntaxElement::Node(self.builder.node(SyntaxKind::ParamList, children))
    }

    fn bump(&mut self) -> SyntaxElement {
        let token = self.tokens[self.pos].clone();
        self.pos += 1;
        let id = self
            .builder
            .token(token.kind, &token.leading, &token.text, &token.trailing);
        SyntaxElement::Token(id)
    }

    fn bump_error(&mut self) -> SyntaxElement {
        let token = self.bump();
        SyntaxElement::Node(self.builder.node(SyntaxKind::Error, vec![token]))
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|token| token.kind)
    }

    fn at_punct(&self, text: &str) -> bool {
        self.peek_is(TokenKind::Punct, text)
    }

    fn at_keyword(&self, text: &str) -> bool {
        self.peek_is(TokenKind::Keyword, text)
    }

    fn peek_is(&self, kind: TokenKind, text: &str) -> bool {
        self.tokens
            .get(self.pos)
            .is_some_and(|token| token.kind == kind && token.text == text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ks_syntax::NodeId;

    fn find_kind(tree: &SyntaxTree, node: NodeId, kind: SyntaxKind) -> Option<NodeId> {
        if tree.node(node).kind == kind {
            return Some(node);
        }
        for child in tree.child_nodes(node) {
            if let Some(found) = find_kind(tree, child, kind) {
                return Some(found);
            }
        }
        None
    }

    fn leading_text(tree: &SyntaxTree, node: NodeId) -> String {
        let token = tree.first_token(node).expect("node has a token");
        tree.token(token).text.clone()
    }

    #[test]
    fn test_parse_round_trips_source() {
        let sources = [
            "let x = cosnole.WriteLine(\"hi\")",
            "  // setup\nlet total = items.map(|x| x.price)\n",
            "List<T>()",
            "a..b )( ,",
        ];
        for source in sources {
            assert_eq!(parse(source).text(), source, "{source:?}");
        }
    }

    #[test]
    fn test_parse_member_call_shape() {
        let tree = parse("cosnole.WriteLine(msg)");
        let call = find_kind(&tree, tree.root(), SyntaxKind::Call).expect("call");
        let access =
            find_kind(&tree, tree.root(), SyntaxKind::MemberAccess).expect("member access");
        assert_eq!(leading_text(&tree, call), "cosnole");
        assert_eq!(leading_text(&tree, access), "cosnole");

        let args = find_kind(&tree, tree.root(), SyntaxKind::ArgList).expect("args");
        let arg_name = find_kind(&tree, args, SyntaxKind::SimpleName).expect("arg name");
        assert_eq!(leading_text(&tree, arg_name), "msg");
    }

    #[test]
    fn test_parse_generic_name() {
        let tree = parse("Lst<T>(x)");
        let generic = find_kind(&tree, tree.root(), SyntaxKind::GenericName).expect("generic");
        assert_eq!(leading_text(&tree, generic), "Lst");
        assert!(find_kind(&tree, generic, SyntaxKind::TypeArgs).is_some());
        // the call wraps the generic name
        let call = find_kind(&tree, tree.root(), SyntaxKind::Call).expect("call");
        assert_eq!(leading_text(&tree, call), "Lst");
    }

    #[test]
    fn test_parse_let_binding() {
        let tree = parse("let count = cuont");
        let binding = find_kind(&tree, tree.root(), SyntaxKind::Let).expect("let");
        let mut names = tree.child_nodes(binding);
        let binder = names.next().expect("binder");
        let value = names.next().expect("value");
        assert_eq!(tree.node(binder).kind, SyntaxKind::SimpleName);
        assert_eq!(leading_text(&tree, binder), "count");
        assert_eq!(leading_text(&tree, value), "cuont");
    }

    #[test]
    fn test_parse_lambda_keeps_params_as_tokens() {
        let tree = parse("items.map(|acc, x| acc.add(x))");
        let lambda = find_kind(&tree, tree.root(), SyntaxKind::Lambda).expect("lambda");
        let params = find_kind(&tree, lambda, SyntaxKind::ParamList).expect("params");
        // parameters are tokens, not name nodes
        assert_eq!(tree.child_nodes(params).count(), 0);
        // the body still holds real name usages
        assert!(find_kind(&tree, lambda, SyntaxKind::MemberAccess).is_some());
    }

    #[test]
    fn test_parse_recovers_from_garbage() {
        let tree = parse("foo ) let = <");
        assert_eq!(tree.text(), "foo ) let = <");
        assert!(find_kind(&tree, tree.root(), SyntaxKind::Error).is_some());
        let name = find_kind(&tree, tree.root(), SyntaxKind::SimpleName).expect("name");
        assert_eq!(leading_text(&tree, name), "foo");
    }

    #[test]
    fn test_parse_empty_source() {
        let tree = parse("");
        assert_eq!(tree.text(), "");
        assert_eq!(tree.child_nodes(tree.root()).count(), 0);
    }
}
