//! AST node types for the synthesizable SystemVerilog subset.
//!
//! The tree is produced by the parser, owned by the [`Design`] root, and
//! immutable thereafter. Every node carries a [`Span`]; nodes synthesized
//! during generate expansion carry [`Span::DUMMY`]. Number and string
//! literals store their text directly so that synthesized nodes need no
//! backing source.

use serde::{Deserialize, Serialize};
use svtool_common::Ident;
use svtool_source::Span;

// ============================================================================
// Design root and modules
// ============================================================================

/// A complete parsed design: the modules of one source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Design {
    /// The modules in declaration order.
    pub modules: Vec<ModuleDecl>,
    /// The span covering the entire file.
    pub span: Span,
}

/// A module declaration with ports and body items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDecl {
    /// The module name.
    pub name: Ident,
    /// ANSI port declarations.
    pub ports: Vec<PortDecl>,
    /// Items declared inside the module body, in source order.
    pub items: Vec<ModuleItem>,
    /// Source span.
    pub span: Span,
}

// ============================================================================
// Ports, types, ranges
// ============================================================================

/// Port or signal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// `input`
    Input,
    /// `output`
    Output,
    /// `inout`
    Inout,
}

/// Data type keyword of a net or variable declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataTypeKind {
    /// `logic`
    Logic,
    /// `wire`
    Wire,
    /// `reg`
    Reg,
    /// `integer`
    Integer,
}

/// A data type: keyword plus an optional packed range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataType {
    /// The type keyword.
    pub kind: DataTypeKind,
    /// Optional packed range `[msb:lsb]`.
    pub range: Option<Range>,
}

/// A packed range `[msb:lsb]`. Both bounds are constant expressions
/// resolved during elaboration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Range {
    /// The MSB (left) expression.
    pub msb: Expression,
    /// The LSB (right) expression.
    pub lsb: Expression,
    /// Source span.
    pub span: Span,
}

/// A port declaration in the module header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortDecl {
    /// Port direction.
    pub direction: Direction,
    /// The port's data type.
    pub ty: DataType,
    /// The port name.
    pub name: Ident,
    /// Source span.
    pub span: Span,
}

// ============================================================================
// Expressions
// ============================================================================

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `+` (unary plus)
    Plus,
    /// `-` (unary minus)
    Minus,
    /// `!` (logical NOT)
    LogicalNot,
    /// `~` (bitwise NOT)
    BitNot,
}

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `&`
    BitAnd,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `&&`
    LogicalAnd,
    /// `||`
    LogicalOr,
    /// `==`
    Eq,
    /// `!=`
    Neq,
    /// `===`
    CaseEq,
    /// `!==`
    CaseNeq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `<<<`
    Ashl,
    /// `>>>`
    Ashr,
}

/// An expression node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expression {
    /// A reference to a named signal, parameter, or genvar.
    Ref {
        /// The interned identifier.
        name: Ident,
        /// Source span.
        span: Span,
    },
    /// A numeric literal. The text is the literal as written
    /// (e.g. `42`, `4'b10x0`, `8'hFF`).
    Number {
        /// The literal text.
        text: String,
        /// Source span.
        span: Span,
    },
    /// A string literal (without the surrounding quotes).
    Str {
        /// The string contents.
        text: String,
        /// Source span.
        span: Span,
    },
    /// A unary operation.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Box<Expression>,
        /// Source span.
        span: Span,
    },
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// The left-hand side.
        lhs: Box<Expression>,
        /// The right-hand side.
        rhs: Box<Expression>,
        /// Source span.
        span: Span,
    },
    /// A ternary conditional `cond ? then : else`.
    Ternary {
        /// The condition.
        cond: Box<Expression>,
        /// The value when true.
        then_expr: Box<Expression>,
        /// The value when false.
        else_expr: Box<Expression>,
        /// Source span.
        span: Span,
    },
    /// A concatenation `{a, b, c}`.
    Concat {
        /// The concatenated elements, leftmost first.
        elems: Vec<Expression>,
        /// Source span.
        span: Span,
    },
    /// A replication `{N{a, b}}`.
    Replicate {
        /// The replication count expression.
        count: Box<Expression>,
        /// The replicated elements.
        elems: Vec<Expression>,
        /// Source span.
        span: Span,
    },
    /// A bit select `base[index]`.
    BitSelect {
        /// The base expression.
        base: Box<Expression>,
        /// The index expression.
        index: Box<Expression>,
        /// Source span.
        span: Span,
    },
}

impl Expression {
    /// Returns the source span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Expression::Ref { span, .. }
            | Expression::Number { span, .. }
            | Expression::Str { span, .. }
            | Expression::Unary { span, .. }
            | Expression::Binary { span, .. }
            | Expression::Ternary { span, .. }
            | Expression::Concat { span, .. }
            | Expression::Replicate { span, .. }
            | Expression::BitSelect { span, .. } => *span,
        }
    }

    /// Returns the identifier if this is a plain reference.
    pub fn as_ref_name(&self) -> Option<Ident> {
        match self {
            Expression::Ref { name, .. } => Some(*name),
            _ => None,
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

/// The kind of case statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseKind {
    /// Standard `case` (exact match).
    Case,
    /// `casez` (z treated as don't-care).
    Casez,
    /// `casex` (x and z treated as don't-care).
    Casex,
}

/// A single arm in a case statement. Empty `matches` marks the default arm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseItem {
    /// The match expressions, or empty for `default`.
    pub matches: Vec<Expression>,
    /// The body statement.
    pub body: Statement,
    /// Source span.
    pub span: Span,
}

/// A statement in a procedural block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Statement {
    /// A null statement (lone `;`).
    Null {
        /// Source span.
        span: Span,
    },
    /// A `begin ... end` block, optionally labeled.
    Block {
        /// Optional block label.
        label: Option<Ident>,
        /// Statements in execution order.
        stmts: Vec<Statement>,
        /// Source span.
        span: Span,
    },
    /// An `if` statement.
    If {
        /// The condition.
        cond: Expression,
        /// The `then` branch.
        then_stmt: Box<Statement>,
        /// Optional `else` branch.
        else_stmt: Option<Box<Statement>>,
        /// Source span.
        span: Span,
    },
    /// A `case`/`casez`/`casex` statement.
    Case {
        /// The case kind.
        kind: CaseKind,
        /// The selector expression.
        expr: Expression,
        /// The case arms.
        items: Vec<CaseItem>,
        /// Source span.
        span: Span,
    },
    /// A blocking assignment `lhs = rhs;`.
    BlockingAssign {
        /// The target expression (identifier or bit select).
        lhs: Expression,
        /// The value expression.
        rhs: Expression,
        /// Source span.
        span: Span,
    },
    /// A non-blocking assignment `lhs <= rhs;`.
    NonBlockingAssign {
        /// The target expression (identifier or bit select).
        lhs: Expression,
        /// The value expression.
        rhs: Expression,
        /// Source span.
        span: Span,
    },
    /// A delay control `#expr stmt`.
    Delay {
        /// The delay expression.
        delay: Expression,
        /// The delayed statement.
        body: Box<Statement>,
        /// Source span.
        span: Span,
    },
    /// An expression statement, e.g. a system task call like `$finish;`.
    ExprStmt {
        /// The expression.
        expr: Expression,
        /// Source span.
        span: Span,
    },
}

impl Statement {
    /// Returns the source span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Statement::Null { span }
            | Statement::Block { span, .. }
            | Statement::If { span, .. }
            | Statement::Case { span, .. }
            | Statement::BlockingAssign { span, .. }
            | Statement::NonBlockingAssign { span, .. }
            | Statement::Delay { span, .. }
            | Statement::ExprStmt { span, .. } => *span,
        }
    }
}

// ============================================================================
// Sensitivity lists
// ============================================================================

/// An edge specifier in a sensitivity list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    /// `posedge`
    Posedge,
    /// `negedge`
    Negedge,
}

/// A single item in a sensitivity list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityItem {
    /// Optional edge specifier.
    pub edge: Option<EdgeKind>,
    /// The watched expression (an identifier in the supported subset).
    pub signal: Expression,
    /// Source span.
    pub span: Span,
}

/// The sensitivity specification of an always construct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SensitivityList {
    /// No event control was written (e.g. `always #5 ...`).
    None,
    /// `@*` or `@(*)`: derive sensitivity from the signals the body reads.
    Star,
    /// An explicit list of items separated by `or` or `,`.
    List(Vec<SensitivityItem>),
}

// ============================================================================
// Module items
// ============================================================================

/// The flavor of an always construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlwaysKind {
    /// `always`
    Always,
    /// `always_comb`
    AlwaysComb,
    /// `always_ff`
    AlwaysFf,
    /// `always_latch`
    AlwaysLatch,
}

/// An `always` construct with its sensitivity and body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlwaysConstruct {
    /// The always flavor.
    pub kind: AlwaysKind,
    /// The sensitivity specification.
    pub sensitivity: SensitivityList,
    /// The body statement.
    pub body: Statement,
    /// Source span.
    pub span: Span,
}

/// An `initial` construct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialConstruct {
    /// The body statement.
    pub body: Statement,
    /// Source span.
    pub span: Span,
}

/// A net declaration (`wire`), one per declared name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetDecl {
    /// The net's data type.
    pub ty: DataType,
    /// The net name.
    pub name: Ident,
    /// Optional initializer expression.
    pub init: Option<Expression>,
    /// Source span.
    pub span: Span,
}

/// A variable declaration (`logic`/`reg`/`integer`), one per declared name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarDecl {
    /// The variable's data type.
    pub ty: DataType,
    /// The variable name.
    pub name: Ident,
    /// Optional initializer expression.
    pub init: Option<Expression>,
    /// Source span.
    pub span: Span,
}

/// A `parameter` or `localparam` declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDecl {
    /// Whether this is a `localparam`.
    pub local: bool,
    /// The parameter name.
    pub name: Ident,
    /// The value expression.
    pub value: Expression,
    /// Source span.
    pub span: Span,
}

/// A continuous assignment `assign lhs = rhs;`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuousAssign {
    /// The target expression (identifier or bit select).
    pub lhs: Expression,
    /// The value expression.
    pub rhs: Expression,
    /// Source span.
    pub span: Span,
}

/// A parameter override or port connection in an instantiation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// The formal name for named connections, `None` for positional.
    pub formal: Option<Ident>,
    /// The actual expression, `None` for unconnected ports.
    pub actual: Option<Expression>,
    /// Source span.
    pub span: Span,
}

/// A module instantiation with parameter overrides and port connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// The instantiated module's name.
    pub module_name: Ident,
    /// The instance name.
    pub instance_name: Ident,
    /// Parameter overrides from `#(...)`.
    pub param_overrides: Vec<Connection>,
    /// Port connections.
    pub port_conns: Vec<Connection>,
    /// Source span.
    pub span: Span,
}

/// A `genvar` declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenvarDecl {
    /// The declared genvar names.
    pub names: Vec<Ident>,
    /// Source span.
    pub span: Span,
}

/// One arm of a generate-case. Empty `matches` marks the default arm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateCaseArm {
    /// The match expressions, or empty for `default`.
    pub matches: Vec<Expression>,
    /// The items produced when this arm is selected.
    pub items: Vec<ModuleItem>,
    /// Source span.
    pub span: Span,
}

/// A generate construct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GenerateItem {
    /// A plain block of generated items.
    Block {
        /// Optional block label.
        label: Option<Ident>,
        /// The items inside the block.
        items: Vec<ModuleItem>,
        /// Source span.
        span: Span,
    },
    /// A generate-if.
    If {
        /// The condition, folded at elaboration time.
        cond: Expression,
        /// Items of the taken branch when the condition is nonzero.
        then_items: Vec<ModuleItem>,
        /// Items of the taken branch when the condition is zero.
        else_items: Vec<ModuleItem>,
        /// Source span.
        span: Span,
    },
    /// A generate-for loop.
    For {
        /// The loop genvar, taken from the init assignment's left-hand
        /// side. `None` when the init was not of the form `genvar = expr`;
        /// elaboration treats that as fatal.
        genvar: Option<Ident>,
        /// The init value expression (right-hand side of `genvar = expr`).
        init: Expression,
        /// The full loop condition (must fold as `genvar < limit`).
        cond: Expression,
        /// The full step value (must fold as `genvar + incr`).
        step: Expression,
        /// Optional body label (`begin: label`).
        label: Option<Ident>,
        /// The loop body items.
        items: Vec<ModuleItem>,
        /// Source span.
        span: Span,
    },
    /// A generate-case.
    Case {
        /// The selector expression, folded at elaboration time.
        expr: Expression,
        /// The case arms.
        arms: Vec<GenerateCaseArm>,
        /// Source span.
        span: Span,
    },
}

/// An item in a module body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModuleItem {
    /// A net declaration.
    Net(NetDecl),
    /// A variable declaration.
    Var(VarDecl),
    /// A parameter declaration.
    Param(ParamDecl),
    /// A continuous assignment.
    Assign(ContinuousAssign),
    /// An always construct.
    Always(AlwaysConstruct),
    /// An initial construct.
    Initial(InitialConstruct),
    /// A module instantiation.
    Instance(Instance),
    /// A generate construct.
    Generate(GenerateItem),
    /// A genvar declaration.
    Genvar(GenvarDecl),
}
