use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::analysis::matcher::Template;
use crate::parser::ast::NodeKind;
use crate::source::SourceFile;

lazy_static! {
    static ref OBJECT_CREATE: Template =
        Template::new("Foo.prototype = Object.create(Bar.prototype)").expect("built-in template");
    static ref SET_PROTOTYPE_OF: Template =
        Template::new("Object.setPrototypeOf(Foo.prototype, Bar.prototype)")
            .expect("built-in template");
}

/// Class name to superclass name. A later link for the same class replaces
/// the earlier one.
#[derive(Debug, Default, Clone, Serialize)]
pub struct InheritanceMap {
    parents: IndexMap<String, String>,
}

impl InheritanceMap {
    pub fn build(files: &[SourceFile]) -> Self {
        let mut map = InheritanceMap::default();
        for file in files {
            map.scan(file);
        }
        debug!(links = map.parents.len(), "resolved inheritance");
        map
    }

    fn scan(&mut self, file: &SourceFile) {
        file.program().walk(&mut |node| match &node.kind {
            NodeKind::AssignmentExpression { .. } => {
                if let Some(captures) = OBJECT_CREATE.captures(node) {
                    if let (Some(class), Some(parent)) = (captures.get("foo"), captures.get("bar")) {
                        self.link(file.text_of(class), file.text_of(parent));
                    }
                }
            }
            NodeKind::CallExpression { .. } => {
                if let Some(captures) = SET_PROTOTYPE_OF.captures(node) {
                    if let (Some(class), Some(parent)) = (captures.get("foo"), captures.get("bar")) {
                        self.link(file.text_of(class), file.text_of(parent));
                    }
                }
            }
            NodeKind::ClassDeclaration(data) => {
                if let (Some(id), Some(parent)) = (&data.id, &data.super_class) {
                    self.link(file.text_of(id), file.text_of(parent));
                }
            }
            _ => {}
        });
    }

    pub fn link(&mut self, class_name: &str, parent_name: &str) {
        self.parents
            .insert(class_name.to_string(), parent_name.to_string());
    }

    pub fn parent_of(&self, class_name: &str) -> Option<&str> {
        self.parents.get(class_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Walks from `class_name` up the chain (itself first) and returns the
    /// first class accepted by `found`. A class seen twice ends the walk.
    pub fn find_ancestor<F>(&self, class_name: &str, mut found: F) -> Option<String>
    where
        F: FnMut(&str) -> bool,
    {
        let mut visited = HashSet::new();
        let mut current = class_name;
        loop {
            if !visited.insert(current) {
                return None;
            }
            if found(current) {
                return Some(current.to_string());
            }
            current = self.parent_of(current)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Origin;

    fn file(name: &str, text: &str) -> SourceFile {
        SourceFile::parse(name, text.to_string(), Origin::Core).unwrap()
    }

    #[test]
    fn recognizes_all_three_idioms() {
        let files = vec![
            file(
                "rpg_objects.js",
                "function Game_Battler() {}\nGame_Battler.prototype = Object.create(Game_BattlerBase.prototype);\nGame_Battler.prototype.constructor = Game_Battler;",
            ),
            file(
                "mz.js",
                "class Game_Actor extends Game_Battler {}\nObject.setPrototypeOf(Sprite_X.prototype, Sprite.prototype);",
            ),
        ];
        let map = InheritanceMap::build(&files);
        assert_eq!(map.parent_of("Game_Battler"), Some("Game_BattlerBase"));
        assert_eq!(map.parent_of("Game_Actor"), Some("Game_Battler"));
        assert_eq!(map.parent_of("Sprite_X"), Some("Sprite"));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn later_links_overwrite_earlier_ones() {
        let files = vec![
            file("a.js", "A.prototype = Object.create(B.prototype);"),
            file("b.js", "A.prototype = Object.create(C.prototype);"),
        ];
        let map = InheritanceMap::build(&files);
        assert_eq!(map.parent_of("A"), Some("C"));
    }

    #[test]
    fn ancestor_walk_survives_cycles() {
        let mut map = InheritanceMap::default();
        map.link("A", "B");
        map.link("B", "A");
        assert_eq!(map.find_ancestor("A", |c| c == "Z"), None);
        assert_eq!(map.find_ancestor("A", |c| c == "B"), Some("B".to_string()));
    }
}
