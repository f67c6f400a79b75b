/// Benchmark runner for project analysis.
///
/// Times parsing and analysis of synthetic projects of growing size, with
/// serial and parallel file loading.

extern crate conflict_finder;

use conflict_finder::config::AnalysisConfig;
use conflict_finder::project::{MemoryReader, Project};
use std::fmt::Write;
use std::path::Path;
use std::time::{Duration, Instant};

const CLASSES: [&str; 6] = [
    "Game_BattlerBase",
    "Game_Battler",
    "Game_Actor",
    "Game_Enemy",
    "Scene_Map",
    "Window_Base",
];

const METHODS: [&str; 8] = [
    "initialize",
    "update",
    "refresh",
    "gainHp",
    "paramBase",
    "onTurnEnd",
    "start",
    "terminate",
];

/// Core file with every class and method, linked into a small hierarchy.
fn core_script() -> String {
    let mut script = String::new();
    for class in CLASSES.iter() {
        let _ = writeln!(script, "function {}() {{ this.initialize.apply(this, arguments); }}", class);
        for method in METHODS.iter() {
            let _ = writeln!(
                script,
                "{}.prototype.{} = function(a, b) {{ this._{} = a + b; return this._{}; }};",
                class, method, method, method
            );
        }
    }
    let _ = writeln!(script, "Game_Battler.prototype = Object.create(Game_BattlerBase.prototype);");
    let _ = writeln!(script, "Game_Actor.prototype = Object.create(Game_Battler.prototype);");
    let _ = writeln!(script, "Game_Enemy.prototype = Object.create(Game_Battler.prototype);");
    script
}

/// Plugin number `n`: patches some methods and overwrites others.
fn plugin_script(n: usize) -> String {
    let mut script = String::from("(function() {\n");
    for (i, class) in CLASSES.iter().enumerate() {
        let method = METHODS[(n + i) % METHODS.len()];
        if (n + i) % 3 == 0 {
            let _ = writeln!(
                script,
                "    {}.prototype.{} = function(a, b) {{ return a * {} + b; }};",
                class, method, n
            );
        } else {
            let alias = format!("_{}_{}_{}", class, method, n);
            let _ = writeln!(script, "    var {} = {}.prototype.{};", alias, class, method);
            let _ = writeln!(
                script,
                "    {}.prototype.{} = function(a, b) {{ var r = {}.call(this, a, b); return r + {}; }};",
                class, method, alias, n
            );
        }
    }
    script.push_str("})();\n");
    script
}

fn synthetic_project(plugins: usize) -> MemoryReader {
    let mut reader = MemoryReader::new();
    for name in ["rpg_core.js", "rpg_managers.js", "rpg_scenes.js", "rpg_sprites.js", "rpg_windows.js"] {
        reader.insert(format!("/bench/js/{}", name), "");
    }
    reader.insert("/bench/js/rpg_objects.js", core_script());
    let mut list = String::from("var $plugins = [\n");
    for n in 0..plugins {
        let _ = writeln!(
            list,
            "{{\"name\":\"Plugin{}\",\"status\":true,\"description\":\"\",\"parameters\":{{}}}},",
            n
        );
        reader.insert(format!("/bench/js/plugins/Plugin{}.js", n), plugin_script(n));
    }
    list.push_str("];\n");
    reader.insert("/bench/js/plugins.js", list);
    reader
}

/// Loads and analyzes the project `iterations` times.
fn run_benchmark(reader: &MemoryReader, config: &AnalysisConfig, iterations: u32) -> (Duration, usize) {
    let project = Project::open(Path::new("/bench"), reader).expect("synthetic project opens");
    let mut conflicts = 0;
    let start = Instant::now();
    for _ in 0..iterations {
        let analysis = project.analyze(reader, config).expect("synthetic project analyzes");
        conflicts = analysis.conflicts().len();
        let _ = analysis.suggest_order();
    }
    (start.elapsed(), conflicts)
}

fn main() {
    println!("=======================================================");
    println!("  conflict-finder - Analysis Benchmarks");
    println!("  Serial vs Parallel Loading");
    println!("=======================================================\n");

    let sizes: Vec<(usize, u32)> = vec![(10, 50), (50, 20), (200, 5), (500, 2)];

    println!(
        "{:<20} {:>10} {:>14} {:>14} {:>10}",
        "Plugins", "Conflicts", "Serial", "Parallel", "Speedup"
    );
    println!("{}", "-".repeat(72));

    let parallel = AnalysisConfig::default();
    let serial = AnalysisConfig {
        parallel_parse: false,
        ..AnalysisConfig::default()
    };

    for (plugins, iterations) in sizes {
        let reader = synthetic_project(plugins);
        let (serial_dur, conflicts) = run_benchmark(&reader, &serial, iterations);
        let (parallel_dur, _) = run_benchmark(&reader, &parallel, iterations);
        let speedup = serial_dur.as_secs_f64() / parallel_dur.as_secs_f64();
        println!(
            "{:<20} {:>10} {:>12.2?} {:>12.2?} {:>9.2}x",
            format!("{} (x{})", plugins, iterations),
            conflicts,
            serial_dur / iterations,
            parallel_dur / iterations,
            speedup
        );
    }
}
