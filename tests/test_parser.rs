//! Parser integration tests on plugin-shaped scripts.


use conflict_finder::parser::ast::{LiteralValue, Node, NodeKind};
use conflict_finder::parser::JsParser;
use project_util::expression;

const PLUGIN: &str = r#"//=============================================================================
// HpGauge.js
//=============================================================================
/*:
 * @plugindesc Shows a gauge.
 * @param Color
 * @default #ff0000
 */
var Imported = Imported || {};
Imported.HpGauge = true;

(function() {
    'use strict';
    var parameters = PluginManager.parameters('HpGauge');
    var color = String(parameters['Color'] || '#ff0000');
    var pattern = /^#([0-9a-f]{6})$/i;

    var _Window_Base_update = Window_Base.prototype.update;
    Window_Base.prototype.update = function() {
        _Window_Base_update.call(this);
        var rate = this.hp / this.mhp / 2
        var label = `${this.name()}: ${Math.floor(rate * 100)}%`
        if (pattern.test(color)) this.drawGauge(label, rate, color);
    };

    class Sprite_Gauge2 extends Sprite {
        static get size() { return 4; }
        update() { super.update(); this.refresh?.(); }
    }
    window.Sprite_Gauge2 = Sprite_Gauge2;
})();
"#;

fn count(program: &Node, type_name: &str) -> usize {
    let mut total = 0;
    program.walk(&mut |node| {
        if node.type_name() == type_name {
            total += 1;
        }
    });
    total
}

#[test]
fn test_plugin_script() {
    let program = JsParser::parse_to_ast_from_str(PLUGIN).unwrap();
    match &program.kind {
        NodeKind::Program { body } => assert_eq!(body.len(), 3),
        other => panic!("not a program: {:?}", other),
    }
    assert_eq!(count(&program, "ClassDeclaration"), 1);
    assert_eq!(count(&program, "TemplateLiteral"), 1);
    assert_eq!(count(&program, "ChainExpression"), 1);
    let mut regexes = vec![];
    program.walk(&mut |node| {
        if let NodeKind::Literal {
            value: LiteralValue::RegExp { pattern, flags },
            ..
        } = &node.kind
        {
            regexes.push((pattern.clone(), flags.clone()));
        }
    });
    assert_eq!(
        regexes,
        vec![("^#([0-9a-f]{6})$".to_string(), "i".to_string())]
    );
}

#[test]
fn test_division_is_not_a_regex() {
    match expression("a / b / c;").kind {
        NodeKind::BinaryExpression { operator, .. } => assert_eq!(operator, "/"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_asi_splits_statements() {
    let program = JsParser::parse_to_ast_from_str("var a = 1\nvar b = a\n++b\nreturn_value()").unwrap();
    match &program.kind {
        NodeKind::Program { body } => assert_eq!(body.len(), 4),
        other => panic!("not a program: {:?}", other),
    }
}

#[test]
fn test_errors_carry_positions() {
    let error = JsParser::parse_to_ast_from_str("var a = 1;\nvar b = ;").unwrap_err();
    let message = error.to_string();
    assert!(message.contains("2:9"), "{}", message);
}
