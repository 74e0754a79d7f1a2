//! Declaration and module-item parsing rules.
//!
//! Covers net/variable/parameter/genvar declarations, continuous assigns,
//! always/initial constructs, module instantiations, and generate
//! constructs.

use crate::ast::*;
use crate::parser::Parser;
use crate::token::TokenKind;
use svtool_common::Ident;

impl Parser<'_> {
    /// Parses module items until `endmodule` (or EOF).
    pub(crate) fn parse_module_items(&mut self) -> Vec<ModuleItem> {
        let mut items = Vec::new();
        while !self.at_eof() && !self.at(TokenKind::Endmodule) {
            let before = self.pos;
            if let Some(item) = self.parse_module_item(&mut items) {
                items.push(item);
            }
            if self.pos == before {
                // No progress; skip the offending token.
                self.error("unexpected token in module body");
                self.advance();
            }
        }
        items
    }

    /// Parses one module item. Items that expand to several declarations
    /// (comma-separated name lists) push all but the last into `extra` and
    /// return the last.
    fn parse_module_item(&mut self, extra: &mut Vec<ModuleItem>) -> Option<ModuleItem> {
        match self.current() {
            TokenKind::Wire => {
                let mut decls = self.parse_net_or_var_decls();
                let last = decls.pop();
                extra.append(&mut decls);
                last
            }
            TokenKind::Logic | TokenKind::Reg | TokenKind::Integer => {
                let mut decls = self.parse_net_or_var_decls();
                let last = decls.pop();
                extra.append(&mut decls);
                last
            }
            TokenKind::Parameter | TokenKind::Localparam => {
                let mut decls = self.parse_param_decls();
                let last = decls.pop();
                extra.append(&mut decls);
                last
            }
            TokenKind::Assign => Some(self.parse_continuous_assign()),
            k if k.is_always() => Some(ModuleItem::Always(self.parse_always())),
            TokenKind::Initial => Some(ModuleItem::Initial(self.parse_initial())),
            TokenKind::Generate => Some(self.parse_generate_region()),
            TokenKind::For => Some(ModuleItem::Generate(self.parse_generate_for())),
            TokenKind::If => Some(ModuleItem::Generate(self.parse_generate_if())),
            TokenKind::Genvar => Some(self.parse_genvar_decl()),
            TokenKind::Identifier => Some(self.parse_instantiation()),
            TokenKind::Semicolon => {
                self.advance();
                None
            }
            _ => None,
        }
    }

    /// Parses a data type: keyword plus optional packed range. A bare range
    /// (e.g. in `parameter [7:0] P = 1`) defaults to `logic`.
    pub(crate) fn parse_data_type(&mut self) -> DataType {
        let kind = match self.current() {
            TokenKind::Wire => {
                self.advance();
                DataTypeKind::Wire
            }
            TokenKind::Logic => {
                self.advance();
                DataTypeKind::Logic
            }
            TokenKind::Reg => {
                self.advance();
                DataTypeKind::Reg
            }
            TokenKind::Integer => {
                self.advance();
                DataTypeKind::Integer
            }
            _ => DataTypeKind::Logic,
        };
        self.eat(TokenKind::Signed);
        let range = if self.at(TokenKind::LeftBracket) {
            Some(self.parse_range())
        } else {
            None
        };
        DataType { kind, range }
    }

    /// Parses a packed range `[msb:lsb]`.
    pub(crate) fn parse_range(&mut self) -> Range {
        let start = self.current_span();
        self.expect(TokenKind::LeftBracket);
        let msb = self.parse_expr();
        self.expect(TokenKind::Colon);
        let lsb = self.parse_expr();
        self.expect(TokenKind::RightBracket);
        Range {
            msb,
            lsb,
            span: start.merge(self.prev_span()),
        }
    }

    /// Parses `wire|logic|reg|integer [signed] [range] name [= init]
    /// {, name [= init]} ;`, producing one item per declared name.
    fn parse_net_or_var_decls(&mut self) -> Vec<ModuleItem> {
        let start = self.current_span();
        let is_net = self.at(TokenKind::Wire);
        let ty = self.parse_data_type();

        let mut items = Vec::new();
        loop {
            let name = self.expect_ident();
            let init = if self.eat(TokenKind::Equals) {
                Some(self.parse_expr())
            } else {
                None
            };
            let span = start.merge(self.prev_span());
            if is_net {
                items.push(ModuleItem::Net(NetDecl {
                    ty: ty.clone(),
                    name,
                    init,
                    span,
                }));
            } else {
                items.push(ModuleItem::Var(VarDecl {
                    ty: ty.clone(),
                    name,
                    init,
                    span,
                }));
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Semicolon);
        items
    }

    /// Parses `parameter|localparam [range] name = value {, name = value} ;`.
    fn parse_param_decls(&mut self) -> Vec<ModuleItem> {
        let start = self.current_span();
        let local = self.at(TokenKind::Localparam);
        self.advance();
        self.eat(TokenKind::Signed);
        if self.at(TokenKind::LeftBracket) {
            // Parameter ranges carry no meaning in this subset.
            let _ = self.parse_range();
        }

        let mut items = Vec::new();
        loop {
            let name = self.expect_ident();
            self.expect(TokenKind::Equals);
            let value = self.parse_expr();
            let span = start.merge(self.prev_span());
            items.push(ModuleItem::Param(ParamDecl {
                local,
                name,
                value,
                span,
            }));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Semicolon);
        items
    }

    /// Parses `assign lhs = rhs ;`.
    fn parse_continuous_assign(&mut self) -> ModuleItem {
        let start = self.current_span();
        self.expect(TokenKind::Assign);
        let lhs = self.parse_lvalue();
        self.expect(TokenKind::Equals);
        let rhs = self.parse_expr();
        self.expect(TokenKind::Semicolon);
        ModuleItem::Assign(ContinuousAssign {
            lhs,
            rhs,
            span: start.merge(self.prev_span()),
        })
    }

    /// Parses `genvar name {, name} ;`.
    fn parse_genvar_decl(&mut self) -> ModuleItem {
        let start = self.current_span();
        self.expect(TokenKind::Genvar);
        let mut names = Vec::new();
        loop {
            names.push(self.expect_ident());
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Semicolon);
        ModuleItem::Genvar(GenvarDecl {
            names,
            span: start.merge(self.prev_span()),
        })
    }

    /// Parses a module instantiation:
    /// `module_name [#(overrides)] inst_name ( connections ) ;`.
    fn parse_instantiation(&mut self) -> ModuleItem {
        let start = self.current_span();
        let module_name = self.expect_ident();

        let param_overrides = if self.eat(TokenKind::Hash) {
            self.expect(TokenKind::LeftParen);
            let conns = self.parse_connection_list();
            self.expect(TokenKind::RightParen);
            conns
        } else {
            Vec::new()
        };

        let instance_name = self.expect_ident();

        self.expect(TokenKind::LeftParen);
        let port_conns = if self.at(TokenKind::RightParen) {
            Vec::new()
        } else {
            self.parse_connection_list()
        };
        self.expect(TokenKind::RightParen);
        self.expect(TokenKind::Semicolon);

        ModuleItem::Instance(Instance {
            module_name,
            instance_name,
            param_overrides,
            port_conns,
            span: start.merge(self.prev_span()),
        })
    }

    /// Parses a comma-separated list of named (`.formal(actual)`) or
    /// positional (`actual`) connections.
    fn parse_connection_list(&mut self) -> Vec<Connection> {
        let mut conns = Vec::new();
        loop {
            let start = self.current_span();
            if self.eat(TokenKind::Dot) {
                let formal = self.expect_ident();
                self.expect(TokenKind::LeftParen);
                let actual = if self.at(TokenKind::RightParen) {
                    None
                } else {
                    Some(self.parse_expr())
                };
                self.expect(TokenKind::RightParen);
                conns.push(Connection {
                    formal: Some(formal),
                    actual,
                    span: start.merge(self.prev_span()),
                });
            } else {
                let actual = self.parse_expr();
                conns.push(Connection {
                    formal: None,
                    actual: Some(actual),
                    span: start.merge(self.prev_span()),
                });
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        conns
    }

    // ========================================================================
    // Generate constructs
    // ========================================================================

    /// Parses a `generate ... endgenerate` region into a generate block item.
    fn parse_generate_region(&mut self) -> ModuleItem {
        let start = self.current_span();
        self.expect(TokenKind::Generate);

        let mut items = Vec::new();
        while !self.at_eof() && !self.at(TokenKind::Endgenerate) {
            let before = self.pos;
            if let Some(item) = self.parse_generate_inner(&mut items) {
                items.push(item);
            }
            if self.pos == before {
                self.error("unexpected token in generate region");
                self.advance();
            }
        }
        self.expect(TokenKind::Endgenerate);

        ModuleItem::Generate(GenerateItem::Block {
            label: None,
            items,
            span: start.merge(self.prev_span()),
        })
    }

    /// Parses one item inside a generate region or generate body.
    fn parse_generate_inner(&mut self, extra: &mut Vec<ModuleItem>) -> Option<ModuleItem> {
        match self.current() {
            TokenKind::For => Some(ModuleItem::Generate(self.parse_generate_for())),
            TokenKind::If => Some(ModuleItem::Generate(self.parse_generate_if())),
            TokenKind::Case => Some(ModuleItem::Generate(self.parse_generate_case())),
            _ => self.parse_module_item(extra),
        }
    }

    /// Parses `for (gv = init; gv < limit; gv = gv + step) body`.
    pub(crate) fn parse_generate_for(&mut self) -> GenerateItem {
        let start = self.current_span();
        self.expect(TokenKind::For);
        self.expect(TokenKind::LeftParen);

        // init: genvar = expr
        let genvar = if self.at(TokenKind::Identifier) {
            Some(self.expect_ident())
        } else {
            self.expected("genvar identifier");
            None
        };
        self.expect(TokenKind::Equals);
        let init = self.parse_expr();
        self.expect(TokenKind::Semicolon);

        // cond
        let cond = self.parse_expr();
        self.expect(TokenKind::Semicolon);

        // step: genvar = expr
        let step_var = if self.at(TokenKind::Identifier) {
            Some(self.expect_ident())
        } else {
            self.expected("genvar identifier");
            None
        };
        self.expect(TokenKind::Equals);
        let step = self.parse_expr();
        self.expect(TokenKind::RightParen);

        if genvar.is_some() && step_var.is_some() && genvar != step_var {
            self.error("generate-for step must assign the loop genvar");
        }

        let (label, items) = self.parse_generate_body();

        GenerateItem::For {
            genvar,
            init,
            cond,
            step,
            label,
            items,
            span: start.merge(self.prev_span()),
        }
    }

    /// Parses `if (cond) body [else body]` at generate level.
    pub(crate) fn parse_generate_if(&mut self) -> GenerateItem {
        let start = self.current_span();
        self.expect(TokenKind::If);
        self.expect(TokenKind::LeftParen);
        let cond = self.parse_expr();
        self.expect(TokenKind::RightParen);

        let (_, then_items) = self.parse_generate_body();
        let else_items = if self.eat(TokenKind::Else) {
            if self.at(TokenKind::If) {
                vec![ModuleItem::Generate(self.parse_generate_if())]
            } else {
                self.parse_generate_body().1
            }
        } else {
            Vec::new()
        };

        GenerateItem::If {
            cond,
            then_items,
            else_items,
            span: start.merge(self.prev_span()),
        }
    }

    /// Parses `case (expr) matches : body ... [default : body] endcase` at
    /// generate level.
    fn parse_generate_case(&mut self) -> GenerateItem {
        let start = self.current_span();
        self.expect(TokenKind::Case);
        self.expect(TokenKind::LeftParen);
        let expr = self.parse_expr();
        self.expect(TokenKind::RightParen);

        let mut arms = Vec::new();
        while !self.at_eof() && !self.at(TokenKind::Endcase) {
            let arm_start = self.current_span();
            let matches = if self.eat(TokenKind::Default) {
                self.eat(TokenKind::Colon);
                Vec::new()
            } else {
                let mut exprs = vec![self.parse_expr()];
                while self.eat(TokenKind::Comma) {
                    exprs.push(self.parse_expr());
                }
                self.expect(TokenKind::Colon);
                exprs
            };
            let (_, items) = self.parse_generate_body();
            arms.push(GenerateCaseArm {
                matches,
                items,
                span: arm_start.merge(self.prev_span()),
            });
        }
        self.expect(TokenKind::Endcase);

        GenerateItem::Case {
            expr,
            arms,
            span: start.merge(self.prev_span()),
        }
    }

    /// Parses a generate body: `begin[: label] items end` or a single item.
    fn parse_generate_body(&mut self) -> (Option<Ident>, Vec<ModuleItem>) {
        if self.eat(TokenKind::Begin) {
            let label = if self.eat(TokenKind::Colon) {
                Some(self.expect_ident())
            } else {
                None
            };
            let mut items = Vec::new();
            while !self.at_eof() && !self.at(TokenKind::End) {
                let before = self.pos;
                if let Some(item) = self.parse_generate_inner(&mut items) {
                    items.push(item);
                }
                if self.pos == before {
                    self.error("unexpected token in generate body");
                    self.advance();
                }
            }
            self.expect(TokenKind::End);
            (label, items)
        } else {
            let mut items = Vec::new();
            if let Some(item) = self.parse_generate_inner(&mut items) {
                items.push(item);
            }
            (None, items)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::parse_source;
    use svtool_common::Interner;
    use svtool_diagnostics::DiagnosticSink;
    use svtool_source::FileId;

    fn parse_items(body: &str) -> (Vec<ModuleItem>, Interner) {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let src = format!("module m; {body} endmodule");
        let design = parse_source(&src, FileId::from_raw(0), &interner, &sink);
        assert!(!sink.has_errors(), "errors: {:?}", sink.diagnostics());
        let mut modules = design.modules;
        (modules.remove(0).items, interner)
    }

    #[test]
    fn wire_decl() {
        let (items, interner) = parse_items("wire w;");
        assert_eq!(items.len(), 1);
        match &items[0] {
            ModuleItem::Net(n) => {
                assert_eq!(interner.resolve(n.name), "w");
                assert_eq!(n.ty.kind, DataTypeKind::Wire);
                assert!(n.init.is_none());
            }
            other => panic!("expected Net, got {other:?}"),
        }
    }

    #[test]
    fn multi_name_wire_decl() {
        let (items, _) = parse_items("wire a, b, sel;");
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| matches!(i, ModuleItem::Net(_))));
    }

    #[test]
    fn reg_decl_with_range_and_init() {
        let (items, _) = parse_items("reg [3:0] r = 4'b1010;");
        match &items[0] {
            ModuleItem::Var(v) => {
                assert_eq!(v.ty.kind, DataTypeKind::Reg);
                assert!(v.ty.range.is_some());
                assert!(matches!(
                    v.init,
                    Some(Expression::Number { ref text, .. }) if text == "4'b1010"
                ));
            }
            other => panic!("expected Var, got {other:?}"),
        }
    }

    #[test]
    fn logic_and_integer_decls() {
        let (items, _) = parse_items("logic l; integer i;");
        assert!(matches!(&items[0], ModuleItem::Var(v) if v.ty.kind == DataTypeKind::Logic));
        assert!(matches!(&items[1], ModuleItem::Var(v) if v.ty.kind == DataTypeKind::Integer));
    }

    #[test]
    fn parameter_decl() {
        let (items, interner) = parse_items("parameter WIDTH = 8; localparam D = WIDTH * 2;");
        match &items[0] {
            ModuleItem::Param(p) => {
                assert!(!p.local);
                assert_eq!(interner.resolve(p.name), "WIDTH");
            }
            other => panic!("expected Param, got {other:?}"),
        }
        assert!(matches!(&items[1], ModuleItem::Param(p) if p.local));
    }

    #[test]
    fn continuous_assign() {
        let (items, _) = parse_items("assign y = a & b;");
        match &items[0] {
            ModuleItem::Assign(a) => {
                assert!(matches!(a.lhs, Expression::Ref { .. }));
                assert!(matches!(
                    a.rhs,
                    Expression::Binary {
                        op: BinaryOp::BitAnd,
                        ..
                    }
                ));
            }
            other => panic!("expected Assign, got {other:?}"),
        }
    }

    #[test]
    fn continuous_assign_bitselect_lhs() {
        let (items, _) = parse_items("assign r[2] = 1'b1;");
        match &items[0] {
            ModuleItem::Assign(a) => assert!(matches!(a.lhs, Expression::BitSelect { .. })),
            other => panic!("expected Assign, got {other:?}"),
        }
    }

    #[test]
    fn genvar_decl() {
        let (items, interner) = parse_items("genvar i, j;");
        match &items[0] {
            ModuleItem::Genvar(g) => {
                assert_eq!(g.names.len(), 2);
                assert_eq!(interner.resolve(g.names[0]), "i");
            }
            other => panic!("expected Genvar, got {other:?}"),
        }
    }

    #[test]
    fn named_instantiation() {
        let (items, interner) = parse_items("counter #(.W(8)) u1 (.clk(clk), .q(q));");
        match &items[0] {
            ModuleItem::Instance(inst) => {
                assert_eq!(interner.resolve(inst.module_name), "counter");
                assert_eq!(interner.resolve(inst.instance_name), "u1");
                assert_eq!(inst.param_overrides.len(), 1);
                assert_eq!(inst.port_conns.len(), 2);
                assert!(inst.port_conns[0].formal.is_some());
            }
            other => panic!("expected Instance, got {other:?}"),
        }
    }

    #[test]
    fn positional_instantiation() {
        let (items, _) = parse_items("sub u0 (a, b);");
        match &items[0] {
            ModuleItem::Instance(inst) => {
                assert!(inst.param_overrides.is_empty());
                assert_eq!(inst.port_conns.len(), 2);
                assert!(inst.port_conns[0].formal.is_none());
            }
            other => panic!("expected Instance, got {other:?}"),
        }
    }

    #[test]
    fn unconnected_port() {
        let (items, _) = parse_items("sub u0 (.clk());");
        match &items[0] {
            ModuleItem::Instance(inst) => {
                assert!(inst.port_conns[0].actual.is_none());
            }
            other => panic!("expected Instance, got {other:?}"),
        }
    }

    #[test]
    fn generate_for_with_label() {
        let (items, interner) =
            parse_items("genvar i; generate for (i=0; i<4; i=i+1) begin: g wire w; end endgenerate");
        match &items[1] {
            ModuleItem::Generate(GenerateItem::Block { items, .. }) => {
                assert_eq!(items.len(), 1);
                match &items[0] {
                    ModuleItem::Generate(GenerateItem::For {
                        genvar,
                        label,
                        items,
                        ..
                    }) => {
                        assert_eq!(interner.resolve(genvar.unwrap()), "i");
                        assert_eq!(interner.resolve(label.unwrap()), "g");
                        assert_eq!(items.len(), 1);
                    }
                    other => panic!("expected For, got {other:?}"),
                }
            }
            other => panic!("expected Generate block, got {other:?}"),
        }
    }

    #[test]
    fn generate_if_else() {
        let (items, _) =
            parse_items("generate if (1) wire a; else wire b; endgenerate");
        match &items[0] {
            ModuleItem::Generate(GenerateItem::Block { items, .. }) => match &items[0] {
                ModuleItem::Generate(GenerateItem::If {
                    then_items,
                    else_items,
                    ..
                }) => {
                    assert_eq!(then_items.len(), 1);
                    assert_eq!(else_items.len(), 1);
                }
                other => panic!("expected If, got {other:?}"),
            },
            other => panic!("expected Generate block, got {other:?}"),
        }
    }

    #[test]
    fn generate_case() {
        let (items, _) = parse_items(
            "parameter SEL = 1; generate case (SEL) 0: wire a; 1: wire b; default: wire c; endcase endgenerate",
        );
        match &items[1] {
            ModuleItem::Generate(GenerateItem::Block { items, .. }) => match &items[0] {
                ModuleItem::Generate(GenerateItem::Case { arms, .. }) => {
                    assert_eq!(arms.len(), 3);
                    assert!(arms[2].matches.is_empty()); // default
                }
                other => panic!("expected Case, got {other:?}"),
            },
            other => panic!("expected Generate block, got {other:?}"),
        }
    }

    #[test]
    fn generate_for_without_region_keyword() {
        let (items, _) = parse_items("genvar i; for (i=0; i<2; i=i+1) begin wire w; end");
        assert!(matches!(
            &items[1],
            ModuleItem::Generate(GenerateItem::For { .. })
        ));
    }
}
