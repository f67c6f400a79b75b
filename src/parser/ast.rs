use std::fmt::Debug;

/// Identifies a node within the tree of one parsed source. Ids are handed out
/// in creation order, so a parent always has a larger id than its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub struct Meta {
    pub id: NodeId,
    pub start_index: usize,
    pub end_index: usize,
}

pub trait HasMeta {
    fn get_meta(&self) -> &Meta;
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    String(String),
    Number(f64),
    BigInt(String),
    Boolean(bool),
    Null,
    RegExp { pattern: String, flags: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Var,
    Let,
    Const,
}

impl VariableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableKind::Var => "var",
            VariableKind::Let => "let",
            VariableKind::Const => "const",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Init,
    Get,
    Set,
}

impl PropertyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKind::Init => "init",
            PropertyKind::Get => "get",
            PropertyKind::Set => "set",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Constructor,
    Method,
    Get,
    Set,
}

impl MethodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodKind::Constructor => "constructor",
            MethodKind::Method => "method",
            MethodKind::Get => "get",
            MethodKind::Set => "set",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FunctionData {
    pub id: Option<Box<Node>>,
    pub params: Vec<Node>,
    /// A `BlockStatement`, or the expression of a concise arrow body.
    pub body: Box<Node>,
    pub generator: bool,
    pub is_async: bool,
    pub expression: bool,
}

#[derive(Debug, Clone)]
pub struct ClassData {
    pub id: Option<Box<Node>>,
    pub super_class: Option<Box<Node>>,
    pub body: Box<Node>,
}

/// ESTree shaped syntax node.
#[derive(Debug, Clone)]
pub struct Node {
    pub meta: Meta,
    pub kind: NodeKind,
}

impl HasMeta for Node {
    fn get_meta(&self) -> &Meta {
        &self.meta
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Program {
        body: Vec<Node>,
    },
    Identifier {
        name: String,
    },
    /// Placeholder that only template fragments contain; it stands for any node.
    Metavariable {
        name: String,
    },
    Literal {
        value: LiteralValue,
        raw: String,
    },
    ThisExpression,
    Super,
    ArrayExpression {
        elements: Vec<Option<Node>>,
    },
    ObjectExpression {
        properties: Vec<Node>,
    },
    Property {
        key: Box<Node>,
        value: Box<Node>,
        kind: PropertyKind,
        method: bool,
        shorthand: bool,
        computed: bool,
    },
    FunctionExpression(FunctionData),
    ArrowFunctionExpression(FunctionData),
    ClassExpression(ClassData),
    ClassBody {
        body: Vec<Node>,
    },
    MethodDefinition {
        key: Box<Node>,
        value: Box<Node>,
        kind: MethodKind,
        computed: bool,
        is_static: bool,
    },
    PropertyDefinition {
        key: Box<Node>,
        value: Option<Box<Node>>,
        computed: bool,
        is_static: bool,
    },
    UnaryExpression {
        operator: String,
        prefix: bool,
        argument: Box<Node>,
    },
    UpdateExpression {
        operator: String,
        prefix: bool,
        argument: Box<Node>,
    },
    BinaryExpression {
        operator: String,
        left: Box<Node>,
        right: Box<Node>,
    },
    LogicalExpression {
        operator: String,
        left: Box<Node>,
        right: Box<Node>,
    },
    AssignmentExpression {
        operator: String,
        left: Box<Node>,
        right: Box<Node>,
    },
    ConditionalExpression {
        test: Box<Node>,
        consequent: Box<Node>,
        alternate: Box<Node>,
    },
    CallExpression {
        callee: Box<Node>,
        arguments: Vec<Node>,
        optional: bool,
    },
    NewExpression {
        callee: Box<Node>,
        arguments: Vec<Node>,
    },
    MemberExpression {
        object: Box<Node>,
        property: Box<Node>,
        computed: bool,
        optional: bool,
    },
    ChainExpression {
        expression: Box<Node>,
    },
    SequenceExpression {
        expressions: Vec<Node>,
    },
    YieldExpression {
        argument: Option<Box<Node>>,
        delegate: bool,
    },
    AwaitExpression {
        argument: Box<Node>,
    },
    TemplateLiteral {
        quasis: Vec<Node>,
        expressions: Vec<Node>,
    },
    TemplateElement {
        raw: String,
        cooked: Option<String>,
        tail: bool,
    },
    TaggedTemplateExpression {
        tag: Box<Node>,
        quasi: Box<Node>,
    },
    SpreadElement {
        argument: Box<Node>,
    },
    MetaProperty {
        meta: Box<Node>,
        property: Box<Node>,
    },
    ObjectPattern {
        properties: Vec<Node>,
    },
    ArrayPattern {
        elements: Vec<Option<Node>>,
    },
    RestElement {
        argument: Box<Node>,
    },
    AssignmentPattern {
        left: Box<Node>,
        right: Box<Node>,
    },
    ExpressionStatement {
        expression: Box<Node>,
    },
    BlockStatement {
        body: Vec<Node>,
    },
    EmptyStatement,
    DebuggerStatement,
    WithStatement {
        object: Box<Node>,
        body: Box<Node>,
    },
    ReturnStatement {
        argument: Option<Box<Node>>,
    },
    LabeledStatement {
        label: Box<Node>,
        body: Box<Node>,
    },
    BreakStatement {
        label: Option<Box<Node>>,
    },
    ContinueStatement {
        label: Option<Box<Node>>,
    },
    IfStatement {
        test: Box<Node>,
        consequent: Box<Node>,
        alternate: Option<Box<Node>>,
    },
    SwitchStatement {
        discriminant: Box<Node>,
        cases: Vec<Node>,
    },
    SwitchCase {
        test: Option<Box<Node>>,
        consequent: Vec<Node>,
    },
    ThrowStatement {
        argument: Box<Node>,
    },
    TryStatement {
        block: Box<Node>,
        handler: Option<Box<Node>>,
        finalizer: Option<Box<Node>>,
    },
    CatchClause {
        param: Option<Box<Node>>,
        body: Box<Node>,
    },
    WhileStatement {
        test: Box<Node>,
        body: Box<Node>,
    },
    DoWhileStatement {
        body: Box<Node>,
        test: Box<Node>,
    },
    ForStatement {
        init: Option<Box<Node>>,
        test: Option<Box<Node>>,
        update: Option<Box<Node>>,
        body: Box<Node>,
    },
    ForInStatement {
        left: Box<Node>,
        right: Box<Node>,
        body: Box<Node>,
    },
    ForOfStatement {
        left: Box<Node>,
        right: Box<Node>,
        body: Box<Node>,
        is_await: bool,
    },
    FunctionDeclaration(FunctionData),
    VariableDeclaration {
        kind: VariableKind,
        declarations: Vec<Node>,
    },
    VariableDeclarator {
        id: Box<Node>,
        init: Option<Box<Node>>,
    },
    ClassDeclaration(ClassData),
}

/// One field of a node as seen by generic tree walkers.
#[derive(Debug, Clone, Copy)]
pub enum Field<'a> {
    Node(&'a Node),
    OptionalNode(Option<&'a Node>),
    List(&'a [Node]),
    SparseList(&'a [Option<Node>]),
    Str(&'a str),
    Bool(bool),
    Literal(&'a LiteralValue),
}

fn opt(node: &Option<Box<Node>>) -> Field<'_> {
    Field::OptionalNode(node.as_deref())
}

fn function_fields(data: &FunctionData) -> Vec<(&'static str, Field<'_>)> {
    vec![
        ("id", opt(&data.id)),
        ("params", Field::List(&data.params)),
        ("body", Field::Node(&data.body)),
        ("generator", Field::Bool(data.generator)),
        ("async", Field::Bool(data.is_async)),
        ("expression", Field::Bool(data.expression)),
    ]
}

fn class_fields(data: &ClassData) -> Vec<(&'static str, Field<'_>)> {
    vec![
        ("id", opt(&data.id)),
        ("superClass", opt(&data.super_class)),
        ("body", Field::Node(&data.body)),
    ]
}

impl Node {
    pub fn new(id: NodeId, start_index: usize, end_index: usize, kind: NodeKind) -> Self {
        Node {
            meta: Meta {
                id,
                start_index,
                end_index,
            },
            kind,
        }
    }

    pub fn id(&self) -> NodeId {
        self.meta.id
    }

    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Program { .. } => "Program",
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::Metavariable { .. } => "Metavariable",
            NodeKind::Literal { .. } => "Literal",
            NodeKind::ThisExpression => "ThisExpression",
            NodeKind::Super => "Super",
            NodeKind::ArrayExpression { .. } => "ArrayExpression",
            NodeKind::ObjectExpression { .. } => "ObjectExpression",
            NodeKind::Property { .. } => "Property",
            NodeKind::FunctionExpression(_) => "FunctionExpression",
            NodeKind::ArrowFunctionExpression(_) => "ArrowFunctionExpression",
            NodeKind::ClassExpression(_) => "ClassExpression",
            NodeKind::ClassBody { .. } => "ClassBody",
            NodeKind::MethodDefinition { .. } => "MethodDefinition",
            NodeKind::PropertyDefinition { .. } => "PropertyDefinition",
            NodeKind::UnaryExpression { .. } => "UnaryExpression",
            NodeKind::UpdateExpression { .. } => "UpdateExpression",
            NodeKind::BinaryExpression { .. } => "BinaryExpression",
            NodeKind::LogicalExpression { .. } => "LogicalExpression",
            NodeKind::AssignmentExpression { .. } => "AssignmentExpression",
            NodeKind::ConditionalExpression { .. } => "ConditionalExpression",
            NodeKind::CallExpression { .. } => "CallExpression",
            NodeKind::NewExpression { .. } => "NewExpression",
            NodeKind::MemberExpression { .. } => "MemberExpression",
            NodeKind::ChainExpression { .. } => "ChainExpression",
            NodeKind::SequenceExpression { .. } => "SequenceExpression",
            NodeKind::YieldExpression { .. } => "YieldExpression",
            NodeKind::AwaitExpression { .. } => "AwaitExpression",
            NodeKind::TemplateLiteral { .. } => "TemplateLiteral",
            NodeKind::TemplateElement { .. } => "TemplateElement",
            NodeKind::TaggedTemplateExpression { .. } => "TaggedTemplateExpression",
            NodeKind::SpreadElement { .. } => "SpreadElement",
            NodeKind::MetaProperty { .. } => "MetaProperty",
            NodeKind::ObjectPattern { .. } => "ObjectPattern",
            NodeKind::ArrayPattern { .. } => "ArrayPattern",
            NodeKind::RestElement { .. } => "RestElement",
            NodeKind::AssignmentPattern { .. } => "AssignmentPattern",
            NodeKind::ExpressionStatement { .. } => "ExpressionStatement",
            NodeKind::BlockStatement { .. } => "BlockStatement",
            NodeKind::EmptyStatement => "EmptyStatement",
            NodeKind::DebuggerStatement => "DebuggerStatement",
            NodeKind::WithStatement { .. } => "WithStatement",
            NodeKind::ReturnStatement { .. } => "ReturnStatement",
            NodeKind::LabeledStatement { .. } => "LabeledStatement",
            NodeKind::BreakStatement { .. } => "BreakStatement",
            NodeKind::ContinueStatement { .. } => "ContinueStatement",
            NodeKind::IfStatement { .. } => "IfStatement",
            NodeKind::SwitchStatement { .. } => "SwitchStatement",
            NodeKind::SwitchCase { .. } => "SwitchCase",
            NodeKind::ThrowStatement { .. } => "ThrowStatement",
            NodeKind::TryStatement { .. } => "TryStatement",
            NodeKind::CatchClause { .. } => "CatchClause",
            NodeKind::WhileStatement { .. } => "WhileStatement",
            NodeKind::DoWhileStatement { .. } => "DoWhileStatement",
            NodeKind::ForStatement { .. } => "ForStatement",
            NodeKind::ForInStatement { .. } => "ForInStatement",
            NodeKind::ForOfStatement { .. } => "ForOfStatement",
            NodeKind::FunctionDeclaration(_) => "FunctionDeclaration",
            NodeKind::VariableDeclaration { .. } => "VariableDeclaration",
            NodeKind::VariableDeclarator { .. } => "VariableDeclarator",
            NodeKind::ClassDeclaration(_) => "ClassDeclaration",
        }
    }

    /// Fields in ESTree order. Location data is not a field.
    pub fn fields(&self) -> Vec<(&'static str, Field<'_>)> {
        match &self.kind {
            NodeKind::Program { body } => vec![("body", Field::List(body))],
            NodeKind::Identifier { name } => vec![("name", Field::Str(name))],
            NodeKind::Metavariable { name } => vec![("name", Field::Str(name))],
            NodeKind::Literal { value, raw } => {
                vec![("value", Field::Literal(value)), ("raw", Field::Str(raw))]
            }
            NodeKind::ThisExpression
            | NodeKind::Super
            | NodeKind::EmptyStatement
            | NodeKind::DebuggerStatement => vec![],
            NodeKind::ArrayExpression { elements } | NodeKind::ArrayPattern { elements } => {
                vec![("elements", Field::SparseList(elements))]
            }
            NodeKind::ObjectExpression { properties } | NodeKind::ObjectPattern { properties } => {
                vec![("properties", Field::List(properties))]
            }
            NodeKind::Property {
                key,
                value,
                kind,
                method,
                shorthand,
                computed,
            } => vec![
                ("key", Field::Node(key)),
                ("value", Field::Node(value)),
                ("kind", Field::Str(kind.as_str())),
                ("method", Field::Bool(*method)),
                ("shorthand", Field::Bool(*shorthand)),
                ("computed", Field::Bool(*computed)),
            ],
            NodeKind::FunctionExpression(data)
            | NodeKind::ArrowFunctionExpression(data)
            | NodeKind::FunctionDeclaration(data) => function_fields(data),
            NodeKind::ClassExpression(data) | NodeKind::ClassDeclaration(data) => {
                class_fields(data)
            }
            NodeKind::ClassBody { body } | NodeKind::BlockStatement { body } => {
                vec![("body", Field::List(body))]
            }
            NodeKind::MethodDefinition {
                key,
                value,
                kind,
                computed,
                is_static,
            } => vec![
                ("key", Field::Node(key)),
                ("value", Field::Node(value)),
                ("kind", Field::Str(kind.as_str())),
                ("computed", Field::Bool(*computed)),
                ("static", Field::Bool(*is_static)),
            ],
            NodeKind::PropertyDefinition {
                key,
                value,
                computed,
                is_static,
            } => vec![
                ("key", Field::Node(key)),
                ("value", opt(value)),
                ("computed", Field::Bool(*computed)),
                ("static", Field::Bool(*is_static)),
            ],
            NodeKind::UnaryExpression {
                operator,
                prefix,
                argument,
            }
            | NodeKind::UpdateExpression {
                operator,
                prefix,
                argument,
            } => vec![
                ("operator", Field::Str(operator)),
                ("prefix", Field::Bool(*prefix)),
                ("argument", Field::Node(argument)),
            ],
            NodeKind::BinaryExpression {
                operator,
                left,
                right,
            }
            | NodeKind::LogicalExpression {
                operator,
                left,
                right,
            }
            | NodeKind::AssignmentExpression {
                operator,
                left,
                right,
            } => vec![
                ("operator", Field::Str(operator)),
                ("left", Field::Node(left)),
                ("right", Field::Node(right)),
            ],
            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => vec![
                ("test", Field::Node(test)),
                ("consequent", Field::Node(consequent)),
                ("alternate", Field::Node(alternate)),
            ],
            NodeKind::CallExpression {
                callee,
                arguments,
                optional,
            } => vec![
                ("callee", Field::Node(callee)),
                ("arguments", Field::List(arguments)),
                ("optional", Field::Bool(*optional)),
            ],
            NodeKind::NewExpression { callee, arguments } => vec![
                ("callee", Field::Node(callee)),
                ("arguments", Field::List(arguments)),
            ],
            NodeKind::MemberExpression {
                object,
                property,
                computed,
                optional,
            } => vec![
                ("object", Field::Node(object)),
                ("property", Field::Node(property)),
                ("computed", Field::Bool(*computed)),
                ("optional", Field::Bool(*optional)),
            ],
            NodeKind::ChainExpression { expression }
            | NodeKind::ExpressionStatement { expression } => {
                vec![("expression", Field::Node(expression))]
            }
            NodeKind::SequenceExpression { expressions } => {
                vec![("expressions", Field::List(expressions))]
            }
            NodeKind::YieldExpression { argument, delegate } => vec![
                ("argument", opt(argument)),
                ("delegate", Field::Bool(*delegate)),
            ],
            NodeKind::AwaitExpression { argument }
            | NodeKind::SpreadElement { argument }
            | NodeKind::RestElement { argument }
            | NodeKind::ThrowStatement { argument } => vec![("argument", Field::Node(argument))],
            NodeKind::TemplateLiteral { quasis, expressions } => vec![
                ("quasis", Field::List(quasis)),
                ("expressions", Field::List(expressions)),
            ],
            NodeKind::TemplateElement { raw, tail, .. } => {
                vec![("raw", Field::Str(raw)), ("tail", Field::Bool(*tail))]
            }
            NodeKind::TaggedTemplateExpression { tag, quasi } => {
                vec![("tag", Field::Node(tag)), ("quasi", Field::Node(quasi))]
            }
            NodeKind::MetaProperty { meta, property } => vec![
                ("meta", Field::Node(meta)),
                ("property", Field::Node(property)),
            ],
            NodeKind::AssignmentPattern { left, right } => {
                vec![("left", Field::Node(left)), ("right", Field::Node(right))]
            }
            NodeKind::WithStatement { object, body } => {
                vec![("object", Field::Node(object)), ("body", Field::Node(body))]
            }
            NodeKind::ReturnStatement { argument } => vec![("argument", opt(argument))],
            NodeKind::LabeledStatement { label, body } => {
                vec![("label", Field::Node(label)), ("body", Field::Node(body))]
            }
            NodeKind::BreakStatement { label } | NodeKind::ContinueStatement { label } => {
                vec![("label", opt(label))]
            }
            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            } => vec![
                ("test", Field::Node(test)),
                ("consequent", Field::Node(consequent)),
                ("alternate", opt(alternate)),
            ],
            NodeKind::SwitchStatement {
                discriminant,
                cases,
            } => vec![
                ("discriminant", Field::Node(discriminant)),
                ("cases", Field::List(cases)),
            ],
            NodeKind::SwitchCase { test, consequent } => vec![
                ("test", opt(test)),
                ("consequent", Field::List(consequent)),
            ],
            NodeKind::TryStatement {
                block,
                handler,
                finalizer,
            } => vec![
                ("block", Field::Node(block)),
                ("handler", opt(handler)),
                ("finalizer", opt(finalizer)),
            ],
            NodeKind::CatchClause { param, body } => {
                vec![("param", opt(param)), ("body", Field::Node(body))]
            }
            NodeKind::WhileStatement { test, body } => {
                vec![("test", Field::Node(test)), ("body", Field::Node(body))]
            }
            NodeKind::DoWhileStatement { body, test } => {
                vec![("body", Field::Node(body)), ("test", Field::Node(test))]
            }
            NodeKind::ForStatement {
                init,
                test,
                update,
                body,
            } => vec![
                ("init", opt(init)),
                ("test", opt(test)),
                ("update", opt(update)),
                ("body", Field::Node(body)),
            ],
            NodeKind::ForInStatement { left, right, body } => vec![
                ("left", Field::Node(left)),
                ("right", Field::Node(right)),
                ("body", Field::Node(body)),
            ],
            NodeKind::ForOfStatement {
                left,
                right,
                body,
                is_await,
            } => vec![
                ("left", Field::Node(left)),
                ("right", Field::Node(right)),
                ("body", Field::Node(body)),
                ("await", Field::Bool(*is_await)),
            ],
            NodeKind::VariableDeclaration { kind, declarations } => vec![
                ("kind", Field::Str(kind.as_str())),
                ("declarations", Field::List(declarations)),
            ],
            NodeKind::VariableDeclarator { id, init } => {
                vec![("id", Field::Node(id)), ("init", opt(init))]
            }
        }
    }

    /// Direct children in field order.
    pub fn children(&self) -> Vec<&Node> {
        let mut children = vec![];
        for (_, field) in self.fields() {
            match field {
                Field::Node(n) => children.push(n),
                Field::OptionalNode(Some(n)) => children.push(n),
                Field::List(list) => children.extend(list.iter()),
                Field::SparseList(list) => children.extend(list.iter().flatten()),
                _ => {}
            }
        }
        children
    }

    /// Pre-order walk over this node and everything below it.
    pub fn walk<'a, F: FnMut(&'a Node)>(&'a self, visit: &mut F) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            visit(node);
            let children = node.children();
            stack.extend(children.into_iter().rev());
        }
    }

    /// Every node below this one (excluding itself), in pre-order, that passes `filter`.
    pub fn descendants_where<'a, F: Fn(&Node) -> bool>(&'a self, filter: F) -> Vec<&'a Node> {
        let mut found = vec![];
        for child in self.children() {
            child.walk(&mut |n| {
                if filter(n) {
                    found.push(n);
                }
            });
        }
        found
    }

    pub fn identifier_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Identifier { name } => Some(name),
            _ => None,
        }
    }

    pub fn is_this(&self) -> bool {
        matches!(self.kind, NodeKind::ThisExpression)
    }

    /// `object.property` with a plain identifier property, as `(object, name)`.
    pub fn as_static_member(&self) -> Option<(&Node, &str)> {
        match &self.kind {
            NodeKind::MemberExpression {
                object,
                property,
                computed: false,
                ..
            } => property.identifier_name().map(|name| (&**object, name)),
            _ => None,
        }
    }
}
