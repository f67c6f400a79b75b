//! End-to-end conflict detection over in-memory files.


use conflict_finder::analysis::conflict::ConflictKind;
use conflict_finder::analysis::history::{MethodKey, PatchStyle};
use conflict_finder::analysis::matcher::{structurally_equal, Template};
use conflict_finder::config::AnalysisConfig;
use conflict_finder::source::Origin;
use project_util::{analyze_sources, analyze_sources_with, describe, expression};

const CORE: &str = r#"
function Game_Battler() {
    this.initialize.apply(this, arguments);
}
Game_Battler.prototype = Object.create(Game_BattlerBase.prototype);
Game_Battler.prototype.constructor = Game_Battler;
Game_Battler.prototype.gainHp = function(value) {
    this._result.hpDamage = -value;
    this.setHp(this.hp + value);
};

function Game_Actor() {
    this.initialize.apply(this, arguments);
}
Game_Actor.prototype = Object.create(Game_Battler.prototype);
Game_Actor.prototype.constructor = Game_Actor;
"#;

#[test]
fn test_template_wildcards_and_exact_matching() {
    let template = Template::new("Foo.prototype.bar = baz").unwrap();
    assert!(template.matches(&expression("Game_Actor.prototype.gainHp = function() {};")));
    assert!(template.matches(&expression("a.b.prototype.c = 1;")));
    assert!(!template.matches(&expression("Game_Actor.constructor.gainHp = 1;")));
    assert!(!template.matches(&expression("Game_Actor.prototype.gainHp += 1;")));

    let call = Template::new("foo(bar)").unwrap();
    assert!(call.matches(&expression("f(x);")));
    assert!(!call.matches(&expression("f(x, y);")));
    assert!(!call.matches(&expression("f();")));

    assert!(structurally_equal(
        &expression("f(1,\n  2);"),
        &expression("f(1, 2);")
    ));
    assert!(!structurally_equal(&expression("f(1, 2);"), &expression("f(1, 3);")));
}

#[test]
fn test_real_identifiers_named_like_metavariables_are_not_wildcards() {
    let first = expression("foo.prototype.update = function() { return 1; };");
    let second = expression("bar.prototype.update = function() { return 1; };");
    assert!(!structurally_equal(&first, &second));
}

#[test]
fn test_identical_redeclaration_is_suppressed() {
    let analysis = analyze_sources(&[
        ("E0.js", Origin::Plugin, "Game_Actor.prototype.gainHp = function(v) { this._hp = v; };"),
        ("E1.js", Origin::Plugin, "Game_Actor.prototype.gainHp = function(v) {\n    this._hp = v;\n};"),
        ("E2.js", Origin::Plugin, "Game_Actor.prototype.gainHp = function(v) { this._hp = 0; };"),
    ]);
    assert_eq!(describe(analysis.conflicts()), vec!["W E1.js:W -> E2.js:W"]);
}

#[test]
fn test_scenario_two_overwrites() {
    let analysis = analyze_sources(&[
        ("A.js", Origin::Plugin, "Game_Actor.prototype.gainHp = function(v) { this._hp += v; };"),
        ("B.js", Origin::Plugin, "Game_Actor.prototype.gainHp = function(v) { this._hp += 2 * v; };"),
    ]);
    let conflicts = analysis.conflicts();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].kind, ConflictKind::Replace);
    assert_eq!(conflicts[0].earlier.file, "A.js");
    assert_eq!(conflicts[0].later.file, "B.js");
    assert_eq!(conflicts[0].name(), "Game_Actor.prototype.gainHp");
    assert!(analysis.is_ignored(0));
}

#[test]
fn test_scenario_patch_then_overwrite_of_owner() {
    let patch = r#"
(function() {
    var _Game_Actor_gainHp = Game_Actor.prototype.gainHp;
    Game_Actor.prototype.gainHp = function(value) {
        _Game_Actor_gainHp.call(this, value);
        this.refresh();
    };
})();
"#;
    let overwrite = r#"
Game_Battler.prototype.gainHp = function(value) {
    this.setHp(Math.max(this.hp + value, 1));
};
"#;
    let analysis = analyze_sources(&[
        ("rpg_objects.js", Origin::Core, CORE),
        ("A.js", Origin::Plugin, patch),
        ("C.js", Origin::Plugin, overwrite),
    ]);
    let outdated: Vec<_> = analysis
        .conflicts()
        .iter()
        .filter(|c| c.kind == ConflictKind::Outdated)
        .collect();
    assert_eq!(outdated.len(), 1);
    assert_eq!(outdated[0].earlier.file, "A.js");
    assert_eq!(outdated[0].earlier.style, PatchStyle::Patching);
    assert_eq!(outdated[0].earlier.owner.as_deref(), Some("Game_Battler"));
    assert_eq!(outdated[0].later.file, "C.js");

    let order = analysis.suggest_order();
    assert_eq!(order.groups, vec![vec!["C.js"], vec!["A.js"]]);

    let reversed = analyze_sources(&[
        ("rpg_objects.js", Origin::Core, CORE),
        ("C.js", Origin::Plugin, overwrite),
        ("A.js", Origin::Plugin, patch),
    ]);
    assert!(reversed
        .conflicts()
        .iter()
        .all(|c| c.kind != ConflictKind::Outdated));
}

#[test]
fn test_patch_on_class_with_own_history_registers_no_alias() {
    let analysis = analyze_sources(&[
        ("rpg_objects.js", Origin::Core, CORE),
        (
            "A.js",
            Origin::Plugin,
            "Game_Actor.prototype.gainHp = function(v) { this._hp += v; };",
        ),
        (
            "B.js",
            Origin::Plugin,
            "var _gainHp = Game_Actor.prototype.gainHp;\nGame_Actor.prototype.gainHp = function(v) { _gainHp.call(this, v); };",
        ),
    ]);
    let histories = analysis.histories();
    let actor = histories.history(&MethodKey::new("Game_Actor", "gainHp", false));
    assert_eq!(actor.len(), 2);
    assert_eq!(actor[1].owner.as_deref(), Some("Game_Actor"));
    assert!(histories
        .aliases_of(&MethodKey::new("Game_Battler", "gainHp", false))
        .is_empty());
}

#[test]
fn test_core_edits_excluded_keep_inheritance() {
    let config = AnalysisConfig {
        include_core_edits: false,
        ..AnalysisConfig::default()
    };
    let analysis = analyze_sources_with(
        &[
            ("rpg_objects.js", Origin::Core, CORE),
            (
                "A.js",
                Origin::Plugin,
                "Game_Battler.prototype.gainHp = function(v) { this._hp = v; };",
            ),
        ],
        &config,
    );
    assert_eq!(analysis.histories().edit_count(), 1);
    assert_eq!(analysis.inheritance().parent_of("Game_Actor"), Some("Game_Battler"));
    assert!(analysis.conflicts().is_empty());
}

#[test]
fn test_override_and_mixing_styles_across_files() {
    let analysis = analyze_sources(&[
        ("rpg_objects.js", Origin::Core, CORE),
        (
            "Override.js",
            Origin::Plugin,
            "Game_Actor.prototype.gainHp = function(v) { Game_Battler.prototype.gainHp.call(this, v); };",
        ),
        (
            "Mix.js",
            Origin::Plugin,
            "var _g = Game_Actor.prototype.gainHp;\nGame_Actor.prototype.gainHp = function(v) { Game_Battler.prototype.gainHp.call(this, v); _g.call(this, v); };",
        ),
    ]);
    let history = analysis
        .histories()
        .history(&MethodKey::new("Game_Actor", "gainHp", false));
    let styles: Vec<PatchStyle> = history.iter().map(|e| e.style).collect();
    assert_eq!(styles, vec![PatchStyle::Override, PatchStyle::Mixing]);
    assert!(analysis.conflicts().is_empty());
}

#[test]
fn test_runs_are_deterministic() {
    let sources = [
        ("rpg_objects.js", Origin::Core, CORE),
        (
            "A.js",
            Origin::Plugin,
            "var _g = Game_Actor.prototype.gainHp;\nGame_Actor.prototype.gainHp = function(v) { _g.call(this, v); };\nWindow_Base.prototype.update = function() {};",
        ),
        (
            "B.js",
            Origin::Plugin,
            "Game_Battler.prototype.gainHp = function(v) {};\nWindow_Base.prototype.update = function() { this.x = 1; };",
        ),
        (
            "C.js",
            Origin::Plugin,
            "Window_Base.prototype.update = function() { this.y = 1; };",
        ),
    ];
    let first = analyze_sources(&sources);
    let second = analyze_sources(&sources);
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    assert_eq!(describe(first.conflicts()), describe(second.conflicts()));
    assert_eq!(first.suggest_order(), second.suggest_order());
}
