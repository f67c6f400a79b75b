use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, trace};

use crate::analysis::inheritance::InheritanceMap;
use crate::analysis::matcher::{structurally_equal, Template};
use crate::config::AnalysisConfig;
use crate::parser::ast::{Node, NodeId, NodeKind, VariableKind};
use crate::source::{Origin, SourceFile, Span};

lazy_static! {
    static ref INSTANCE_METHOD: Template =
        Template::new("Foo.prototype.bar = baz").expect("built-in template");
    static ref STATIC_METHOD: Template = Template::new("Foo.bar = baz").expect("built-in template");
    static ref CALL_THIS: Template = Template::new("foo.call").expect("built-in template");
    static ref APPLY_THIS: Template = Template::new("foo.apply").expect("built-in template");
    static ref PROTOTYPE_MEMBER: Template =
        Template::new("foo.prototype.bar").expect("built-in template");
}

/// One patchable member slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MethodKey {
    pub class_name: String,
    pub method_name: String,
    pub is_static: bool,
}

impl MethodKey {
    pub fn new(class_name: &str, method_name: &str, is_static: bool) -> Self {
        MethodKey {
            class_name: class_name.to_string(),
            method_name: method_name.to_string(),
            is_static,
        }
    }

    fn with_class(&self, class_name: &str) -> Self {
        MethodKey::new(class_name, &self.method_name, self.is_static)
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_static {
            write!(f, "{}.{}", self.class_name, self.method_name)
        } else {
            write!(f, "{}.prototype.{}", self.class_name, self.method_name)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchStyle {
    /// Replaced without touching the previous implementation.
    Overwrite,
    /// Replaced, calling the ancestor's implementation of the same method.
    Override,
    /// Calls a captured copy of the previous implementation.
    Patching,
    /// Ancestor call together with an alias call, or an alias obtained
    /// through another call.
    Mixing,
}

impl PatchStyle {
    /// Overwrite and override discard whatever implementation came before.
    pub fn is_replacement(&self) -> bool {
        matches!(self, PatchStyle::Overwrite | PatchStyle::Override)
    }

    pub fn letter(&self) -> char {
        match self {
            PatchStyle::Overwrite => 'W',
            PatchStyle::Override => 'R',
            PatchStyle::Patching => 'P',
            PatchStyle::Mixing => 'M',
        }
    }
}

/// One recorded method assignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edit {
    pub file: String,
    pub origin: Origin,
    pub span: Span,
    pub style: PatchStyle,
    pub class_name: String,
    pub method_name: String,
    pub is_static: bool,
    pub display_name: String,
    pub target_span: Span,
    pub alias_count: usize,
    pub changed: bool,
    /// Class whose implementation a patching edit actually captured.
    pub owner: Option<String>,
}

impl Edit {
    pub fn key(&self) -> MethodKey {
        MethodKey::new(&self.class_name, &self.method_name, self.is_static)
    }
}

/// A patching edit on a subclass that really captured an ancestor's method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasRecord {
    pub subclass: MethodKey,
    pub index: usize,
}

/// Method histories and the alias registry, in first-seen key order.
#[derive(Debug, Default, Serialize)]
pub struct Histories {
    pub methods: IndexMap<MethodKey, Vec<Edit>>,
    pub aliases: IndexMap<MethodKey, Vec<AliasRecord>>,
}

impl Histories {
    pub fn build(files: &[SourceFile], inheritance: &InheritanceMap, config: &AnalysisConfig) -> Self {
        let mut builder = HistoryBuilder {
            histories: Histories::default(),
            last_assignment: IndexMap::new(),
            inheritance,
            config,
        };
        for file in files {
            if file.origin() == Origin::Core && !config.include_core_edits {
                continue;
            }
            builder.scan(file);
        }
        builder.histories
    }

    pub fn history(&self, key: &MethodKey) -> &[Edit] {
        self.methods.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn aliases_of(&self, key: &MethodKey) -> &[AliasRecord] {
        self.aliases.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn resolve(&self, record: &AliasRecord) -> Option<&Edit> {
        self.methods.get(&record.subclass)?.get(record.index)
    }

    pub fn edit_count(&self) -> usize {
        self.methods.values().map(Vec::len).sum()
    }
}

struct HistoryBuilder<'a> {
    histories: Histories,
    last_assignment: IndexMap<MethodKey, &'a Node>,
    inheritance: &'a InheritanceMap,
    config: &'a AnalysisConfig,
}

/// A method assignment that passed the shape checks.
struct Target<'a> {
    key: MethodKey,
    member: &'a Node,
    function: &'a Node,
}

impl<'a> HistoryBuilder<'a> {
    fn scan(&mut self, file: &'a SourceFile) {
        let mut assignments = vec![];
        file.program().walk(&mut |node| {
            if matches!(node.kind, NodeKind::AssignmentExpression { .. }) {
                assignments.push(node);
            }
        });
        let scope = FileScope::new(file);
        for assignment in assignments.iter().copied() {
            if let Some(target) = self.qualify(file, assignment) {
                self.record(file, &scope, assignment, target);
            }
        }
    }

    fn qualify(&self, file: &'a SourceFile, assignment: &'a Node) -> Option<Target<'a>> {
        let (captures, is_static) = match INSTANCE_METHOD.captures(assignment) {
            Some(captures) => (captures, false),
            None => (STATIC_METHOD.captures(assignment)?, true),
        };
        let class = captures.get("foo")?;
        let method_name = captures.get("bar")?.identifier_name()?;
        let function = captures.get("baz")?;
        if !matches!(function.kind, NodeKind::FunctionExpression(_)) || !is_dotted_path(class) {
            return None;
        }
        let class_name = file.text_of(class);
        if self.config.is_reserved(class_name) {
            return None;
        }
        let member = match &assignment.kind {
            NodeKind::AssignmentExpression { left, .. } => &**left,
            _ => return None,
        };
        Some(Target {
            key: MethodKey::new(class_name, method_name, is_static),
            member,
            function,
        })
    }

    fn record(&mut self, file: &'a SourceFile, scope: &FileScope<'a>, assignment: &'a Node, target: Target<'a>) {
        let key = target.key;
        let style = classify(scope, assignment, target.function, &key.method_name);
        let changed = match self.last_assignment.get(&key) {
            Some(previous) => !structurally_equal(previous, assignment),
            None => true,
        };
        let alias_count = self.histories.aliases_of(&key).len();
        let owner = if style == PatchStyle::Patching {
            let owner = self.inheritance.find_ancestor(&key.class_name, |class| {
                !self.histories.history(&key.with_class(class)).is_empty()
            });
            trace!(method = %key, owner = ?owner, "resolved real owner");
            owner
        } else {
            None
        };
        let edit = Edit {
            file: file.name().to_string(),
            origin: file.origin(),
            span: file.span_of(assignment),
            style,
            class_name: key.class_name.clone(),
            method_name: key.method_name.clone(),
            is_static: key.is_static,
            display_name: file.text_of(target.member).to_string(),
            target_span: file.span_of(target.member),
            alias_count,
            changed,
            owner: owner.clone(),
        };
        debug!(file = file.name(), method = %key, style = ?style, changed, "recorded edit");
        self.last_assignment.insert(key.clone(), assignment);
        let history = self.histories.methods.entry(key.clone()).or_default();
        history.push(edit);
        let index = history.len() - 1;
        if let Some(owner) = owner.filter(|owner| *owner != key.class_name) {
            self.histories
                .aliases
                .entry(key.with_class(&owner))
                .or_default()
                .push(AliasRecord {
                    subclass: key,
                    index,
                });
        }
    }
}

/// `a`, `a.b`, `a.b.c`: identifiers joined by non-computed member access.
fn is_dotted_path(node: &Node) -> bool {
    match &node.kind {
        NodeKind::Identifier { .. } => true,
        NodeKind::MemberExpression {
            object,
            property,
            computed: false,
            optional: false,
        } => property.identifier_name().is_some() && is_dotted_path(object),
        _ => false,
    }
}

/// Bindings of one file that can make an alias indirect.
struct FileScope<'a> {
    file: &'a SourceFile,
    declarators: Vec<(&'a Node, VariableKind)>,
    assignments: Vec<&'a Node>,
    /// Scope nodes; `true` for blocks, `false` for functions and the program.
    scopes: HashMap<NodeId, bool>,
}

impl<'a> FileScope<'a> {
    fn new(file: &'a SourceFile) -> Self {
        let mut declarators = vec![];
        let mut assignments = vec![];
        let mut scopes = HashMap::new();
        file.program().walk(&mut |node| match &node.kind {
            NodeKind::VariableDeclaration { kind, declarations } => {
                declarators.extend(declarations.iter().map(|d| (d, *kind)));
            }
            NodeKind::AssignmentExpression { operator, .. } if operator == "=" => {
                assignments.push(node)
            }
            NodeKind::BlockStatement { .. } => {
                scopes.insert(node.id(), true);
            }
            NodeKind::Program { .. }
            | NodeKind::FunctionDeclaration(_)
            | NodeKind::FunctionExpression(_)
            | NodeKind::ArrowFunctionExpression(_) => {
                scopes.insert(node.id(), false);
            }
            _ => {}
        });
        FileScope {
            file,
            declarators,
            assignments,
            scopes,
        }
    }

    /// Whether `alias`, as used inside the edit `assignment`, holds a value
    /// produced by a call rather than a plain snapshot of a method.
    fn is_indirect(&self, alias: &Node, assignment: &Node) -> bool {
        match &alias.kind {
            NodeKind::Identifier { name } => self
                .declarators
                .iter()
                .filter(|(declarator, kind)| {
                    declarator.meta.end_index <= assignment.meta.start_index
                        && declares(declarator, name)
                        && self.encloses(declarator, *kind, assignment)
                })
                .last()
                .map_or(false, |(declarator, _)| match &declarator.kind {
                    NodeKind::VariableDeclarator { init: Some(init), .. } => is_call(init),
                    _ => false,
                }),
            NodeKind::MemberExpression { .. } => self
                .assignments
                .iter()
                .filter(|other| other.meta.end_index <= assignment.meta.start_index)
                .filter_map(|other| match &other.kind {
                    NodeKind::AssignmentExpression { left, right, .. }
                        if structurally_equal(left, alias) =>
                    {
                        Some(right)
                    }
                    _ => None,
                })
                .last()
                .map_or(false, |right| is_call(right)),
            _ => false,
        }
    }

    /// Whether the scope holding `declarator` contains `node`.
    fn encloses(&self, declarator: &Node, kind: VariableKind, node: &Node) -> bool {
        let nodes = self.file.nodes();
        let scope = nodes.ancestors(declarator.id()).find(|id| {
            self.scopes
                .get(id)
                .map_or(false, |is_block| kind != VariableKind::Var || !is_block)
        });
        match scope {
            Some(scope) => nodes.is_ancestor(scope, node.id()),
            None => true,
        }
    }
}

fn declares(declarator: &Node, name: &str) -> bool {
    match &declarator.kind {
        NodeKind::VariableDeclarator { id, .. } => id.identifier_name() == Some(name),
        _ => false,
    }
}

fn is_call(node: &Node) -> bool {
    matches!(node.kind, NodeKind::CallExpression { .. })
}

/// Receivers `X` of every `X.call(this, ...)` / `X.apply(this, ...)` inside
/// the function, nested functions included.
fn this_calls(function: &Node) -> Vec<&Node> {
    function
        .descendants_where(|node| matches!(node.kind, NodeKind::CallExpression { .. }))
        .into_iter()
        .filter_map(|call| match &call.kind {
            NodeKind::CallExpression {
                callee, arguments, ..
            } if arguments.first().map_or(false, Node::is_this) => CALL_THIS
                .captures(callee)
                .or_else(|| APPLY_THIS.captures(callee))
                .and_then(|captures| captures.get("foo")),
            _ => None,
        })
        .collect()
}

fn classify(scope: &FileScope<'_>, assignment: &Node, function: &Node, method_name: &str) -> PatchStyle {
    let receivers = this_calls(function);
    if receivers.is_empty() {
        return PatchStyle::Overwrite;
    }
    let is_super_call = |receiver: &Node| {
        PROTOTYPE_MEMBER
            .captures(receiver)
            .and_then(|captures| captures.get("bar"))
            .and_then(Node::identifier_name)
            == Some(method_name)
    };
    let (super_calls, alias_calls): (Vec<&Node>, Vec<&Node>) =
        receivers.into_iter().partition(|receiver| is_super_call(*receiver));
    if !super_calls.is_empty() {
        return if alias_calls.is_empty() {
            PatchStyle::Override
        } else {
            PatchStyle::Mixing
        };
    }
    if alias_calls
        .iter()
        .any(|alias| scope.is_indirect(alias, assignment))
    {
        PatchStyle::Mixing
    } else {
        PatchStyle::Patching
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(sources: &[(&str, Origin, &str)]) -> Histories {
        let files: Vec<SourceFile> = sources
            .iter()
            .map(|(name, origin, text)| SourceFile::parse(name, text.to_string(), *origin).unwrap())
            .collect();
        let inheritance = InheritanceMap::build(&files);
        Histories::build(&files, &inheritance, &AnalysisConfig::default())
    }

    fn styles(histories: &Histories, key: &MethodKey) -> Vec<PatchStyle> {
        histories.history(key).iter().map(|e| e.style).collect()
    }

    #[test]
    fn classifies_the_four_styles() {
        let histories = build(&[(
            "styles.js",
            Origin::Plugin,
            r#"
            A.prototype.overwrite = function() { return 1; };
            B.prototype.override = function() { A.prototype.override.call(this); };
            var _patch = C.prototype.patch;
            C.prototype.patch = function(x) { return _patch.apply(this, arguments) + x; };
            var _mix = D.prototype.mix;
            D.prototype.mix = function() { A.prototype.mix.call(this); _mix.call(this); };
            var _wrapped = PluginManager.alias(E.prototype, "indirect");
            E.prototype.indirect = function() { _wrapped.call(this); };
            "#,
        )]);
        assert_eq!(
            styles(&histories, &MethodKey::new("A", "overwrite", false)),
            vec![PatchStyle::Overwrite]
        );
        assert_eq!(
            styles(&histories, &MethodKey::new("B", "override", false)),
            vec![PatchStyle::Override]
        );
        assert_eq!(
            styles(&histories, &MethodKey::new("C", "patch", false)),
            vec![PatchStyle::Patching]
        );
        assert_eq!(
            styles(&histories, &MethodKey::new("D", "mix", false)),
            vec![PatchStyle::Mixing]
        );
        assert_eq!(
            styles(&histories, &MethodKey::new("E", "indirect", false)),
            vec![PatchStyle::Mixing]
        );
    }

    #[test]
    fn member_alias_assigned_from_call_is_mixing() {
        let histories = build(&[(
            "member.js",
            Origin::Plugin,
            r#"
            Imported.aliases.refresh = Foo.prototype.refresh;
            Imported.wrapped.refresh = wrap(Foo.prototype.refresh);
            Foo.prototype.refresh = function() { Imported.aliases.refresh.call(this); };
            Bar.prototype.refresh = function() { Imported.wrapped.refresh.call(this); };
            "#,
        )]);
        assert_eq!(
            styles(&histories, &MethodKey::new("Foo", "refresh", false)),
            vec![PatchStyle::Patching]
        );
        assert_eq!(
            styles(&histories, &MethodKey::new("Bar", "refresh", false)),
            vec![PatchStyle::Mixing]
        );
    }

    #[test]
    fn calls_without_this_do_not_count() {
        let histories = build(&[(
            "nothis.js",
            Origin::Plugin,
            "var _f = A.prototype.f;\nA.prototype.f = function() { _f.call(other); };",
        )]);
        assert_eq!(
            styles(&histories, &MethodKey::new("A", "f", false)),
            vec![PatchStyle::Overwrite]
        );
    }

    #[test]
    fn out_of_scope_binding_is_not_consulted() {
        let histories = build(&[(
            "scope.js",
            Origin::Plugin,
            r#"
            (function() { var _g = wrap(A.prototype.g); })();
            (function() {
                var _g = A.prototype.g;
                A.prototype.g = function() { _g.call(this); };
            })();
            (function() {
                B.prototype.g = function() { _g.call(this); };
            })();
            "#,
        )]);
        assert_eq!(
            styles(&histories, &MethodKey::new("A", "g", false)),
            vec![PatchStyle::Patching]
        );
        assert_eq!(
            styles(&histories, &MethodKey::new("B", "g", false)),
            vec![PatchStyle::Patching]
        );
    }

    #[test]
    fn static_and_instance_slots_are_distinct() {
        let histories = build(&[(
            "static.js",
            Origin::Plugin,
            "A.make = function() {};\nA.prototype.make = function() {};\n$.make = function() {};\nthis.x = function() {};",
        )]);
        assert_eq!(histories.methods.len(), 2);
        let statics = histories.history(&MethodKey::new("A", "make", true));
        assert_eq!(statics[0].display_name, "A.make");
        assert_eq!(
            MethodKey::new("A", "make", false).to_string(),
            "A.prototype.make"
        );
    }

    #[test]
    fn changed_flag_compares_with_previous_edit() {
        let histories = build(&[
            ("one.js", Origin::Plugin, "A.prototype.f = function() { return 1; };"),
            ("two.js", Origin::Plugin, "A.prototype.f = function() {\n  return 1;\n};"),
            ("three.js", Origin::Plugin, "A.prototype.f = function() { return 2; };"),
        ]);
        let changed: Vec<bool> = histories
            .history(&MethodKey::new("A", "f", false))
            .iter()
            .map(|e| e.changed)
            .collect();
        assert_eq!(changed, vec![true, false, true]);
    }

    #[test]
    fn patch_on_subclass_registers_alias_under_owner() {
        let histories = build(&[
            (
                "rpg_objects.js",
                Origin::Core,
                "Game_Actor.prototype = Object.create(Game_Battler.prototype);\nGame_Battler.prototype.gainHp = function(v) { this._hp += v; };",
            ),
            (
                "A.js",
                Origin::Plugin,
                "var _gainHp = Game_Actor.prototype.gainHp;\nGame_Actor.prototype.gainHp = function(v) { _gainHp.call(this, v); };",
            ),
            (
                "B.js",
                Origin::Plugin,
                "var _gainHp = Game_Actor.prototype.gainHp;\nGame_Actor.prototype.gainHp = function(v) { _gainHp.call(this, v * 2); };",
            ),
        ]);
        let owner_key = MethodKey::new("Game_Battler", "gainHp", false);
        let actor_key = MethodKey::new("Game_Actor", "gainHp", false);
        let actor = histories.history(&actor_key);
        assert_eq!(actor[0].owner.as_deref(), Some("Game_Battler"));
        assert_eq!(actor[1].owner.as_deref(), Some("Game_Actor"));
        assert_eq!(
            histories.aliases_of(&owner_key),
            &[AliasRecord {
                subclass: actor_key.clone(),
                index: 0
            }]
        );
        assert_eq!(histories.resolve(&histories.aliases_of(&owner_key)[0]), Some(&actor[0]));
    }

    #[test]
    fn core_edits_can_be_excluded() {
        let files = vec![
            SourceFile::parse(
                "rpg_objects.js",
                "A.prototype.f = function() {};".to_string(),
                Origin::Core,
            )
            .unwrap(),
            SourceFile::parse(
                "p.js",
                "A.prototype.f = function() { return 1; };".to_string(),
                Origin::Plugin,
            )
            .unwrap(),
        ];
        let config = AnalysisConfig {
            include_core_edits: false,
            ..AnalysisConfig::default()
        };
        let histories = Histories::build(&files, &InheritanceMap::build(&files), &config);
        let history = histories.history(&MethodKey::new("A", "f", false));
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].file, "p.js");
    }
}
