//! Projects on disk: engine detection, plugin list, loading and analysis.


use conflict_finder::analysis::conflict::ConflictKind;
use conflict_finder::config::AnalysisConfig;
use conflict_finder::error::Error;
use conflict_finder::project::{analyze_project, DiskReader, EngineVersion, Project};
use project_util::{remove, write_project};

const MZ_OBJECTS: &str = r#"
class Game_Battler extends Game_BattlerBase {
    gainHp(value) {
        this.setHp(this.hp + value);
    }
}
Game_Actor.prototype = Object.create(Game_Battler.prototype);
Game_Battler.prototype.gainHp = function(value) {
    this.setHp(this.hp + value);
};
"#;

#[test]
fn test_mz_project_end_to_end() {
    let dir = write_project(
        EngineVersion::MZ,
        &[("rmmz_objects.js", MZ_OBJECTS)],
        &[
            (
                "HpPatch",
                true,
                "(() => {\n    const _gainHp = Game_Actor.prototype.gainHp;\n    Game_Actor.prototype.gainHp = function(value) {\n        _gainHp.call(this, value * 2);\n    };\n})();",
            ),
            ("Disabled", false, "this is not even javascript"),
            (
                "HpOverwrite",
                true,
                "Game_Battler.prototype.gainHp = function(value) {\n    this.setHp(value);\n};",
            ),
        ],
    );
    let project = Project::open(dir.path(), &DiskReader).unwrap();
    assert_eq!(project.version(), EngineVersion::MZ);
    assert_eq!(project.plugins().len(), 3);
    assert_eq!(project.enabled_plugins().count(), 2);

    let analysis = project.analyze(&DiskReader, &AnalysisConfig::default()).unwrap();
    assert_eq!(analysis.plugin_files(), vec!["HpPatch.js", "HpOverwrite.js"]);
    let outdated: Vec<_> = analysis
        .conflicts()
        .iter()
        .filter(|c| c.kind == ConflictKind::Outdated)
        .collect();
    assert_eq!(outdated.len(), 1);
    assert_eq!(outdated[0].earlier.file, "HpPatch.js");
    assert_eq!(outdated[0].earlier.span.start.line, 3);
    assert_eq!(outdated[0].later.file, "HpOverwrite.js");
    assert_eq!(
        analysis.suggest_order().groups,
        vec![vec!["HpOverwrite.js"], vec!["HpPatch.js"]]
    );
}

#[test]
fn test_mv_project_is_detected() {
    let dir = write_project(EngineVersion::MV, &[], &[("Solo", true, "var a = 1;")]);
    let analysis = analyze_project(dir.path(), &DiskReader, &AnalysisConfig::default()).unwrap();
    assert_eq!(analysis.files().len(), 7);
    assert_eq!(analysis.files()[0].name, "rpg_core.js");
    assert!(analysis.conflicts().is_empty());
}

#[test]
fn test_missing_plugin_file_is_fatal() {
    let dir = write_project(EngineVersion::MV, &[], &[("Gone", true, "")]);
    remove(dir.path(), "js/plugins/Gone.js");
    match analyze_project(dir.path(), &DiskReader, &AnalysisConfig::default()) {
        Err(Error::Read { path, .. }) => assert!(path.ends_with("js/plugins/Gone.js")),
        other => panic!("unexpected result: {:?}", other.map(|a| a.conflicts().len())),
    }
}

#[test]
fn test_parse_error_names_the_file() {
    let dir = write_project(EngineVersion::MV, &[], &[("Broken", true, "var = ;")]);
    match analyze_project(dir.path(), &DiskReader, &AnalysisConfig::default()) {
        Err(Error::Parse { file, .. }) => assert_eq!(file, "Broken.js"),
        other => panic!("unexpected result: {:?}", other.map(|a| a.conflicts().len())),
    }
}

#[test]
fn test_plugin_list_must_be_literal() {
    let dir = write_project(EngineVersion::MV, &[], &[]);
    std::fs::write(
        dir.path().join("js/plugins.js"),
        "var $plugins = [{name: 'A', status: isEnabled()}];",
    )
    .unwrap();
    assert!(matches!(
        Project::open(dir.path(), &DiskReader),
        Err(Error::PluginList { .. })
    ));
}

#[test]
fn test_config_file_is_applied() {
    let dir = write_project(
        EngineVersion::MV,
        &[("rpg_objects.js", "Game_Map.prototype.setup = function() {};")],
        &[("Map", true, "Game_Map.prototype.setup = function(id) { this._mapId = id; };")],
    );
    let config_path = dir.path().join("settings.json");
    std::fs::write(&config_path, r#"{"include_core_edits": false, "parallel_parse": false}"#).unwrap();
    let config = AnalysisConfig::from_json_file(&config_path).unwrap();
    let analysis = analyze_project(dir.path(), &DiskReader, &config).unwrap();
    assert!(analysis.conflicts().is_empty());

    let analysis = analyze_project(dir.path(), &DiskReader, &AnalysisConfig::default()).unwrap();
    assert_eq!(analysis.conflicts().len(), 1);
    assert_eq!(analysis.conflicts()[0].earlier.file, "rpg_objects.js");
}
