//! Supported languages and how each one is run.

use super::plan::{Invocation, Plan, Step};
use crate::error::BridgeError;
use std::path::Path;
use std::str::FromStr;

/// How a language's scripts are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeKind {
    /// `program [pre...] script [args...]`.
    Interpret {
        program: &'static str,
        pre: &'static [&'static str],
    },
    /// `compiler [flags...] script -o <out>`, then `<out> [args...]`.
    CompileRun {
        compiler: &'static str,
        flags: &'static [&'static str],
    },
    /// `kotlinc script -include-runtime -d <jar>`, then `java -jar <jar> [args...]`.
    KotlinJar,
    /// `juliac --output-exe <out> script`, then `<out> [args...]`.
    JuliaExe,
}

/// A script language with a bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    Julia,
    JuliaAot,
    Go,
    JavaScript,
    TypeScript,
    Lua,
    R,
    Mojo,
    Zig,
    Wasm,
    Haskell,
    Swift,
    Kotlin,
    KotlinAot,
    Nim,
    Fortran,
}

impl Language {
    /// Every supported language.
    pub const ALL: [Language; 17] = [
        Language::Python,
        Language::Julia,
        Language::JuliaAot,
        Language::Go,
        Language::JavaScript,
        Language::TypeScript,
        Language::Lua,
        Language::R,
        Language::Mojo,
        Language::Zig,
        Language::Wasm,
        Language::Haskell,
        Language::Swift,
        Language::Kotlin,
        Language::KotlinAot,
        Language::Nim,
        Language::Fortran,
    ];

    /// Short name used on the command line and in daemon requests.
    pub fn name(&self) -> &'static str {
        match self {
            Language::Python => "py",
            Language::Julia => "jl",
            Language::JuliaAot => "jlc",
            Language::Go => "go",
            Language::JavaScript => "js",
            Language::TypeScript => "ts",
            Language::Lua => "lua",
            Language::R => "r",
            Language::Mojo => "mojo",
            Language::Zig => "zig",
            Language::Wasm => "wasm",
            Language::Haskell => "hs",
            Language::Swift => "swift",
            Language::Kotlin => "kt",
            Language::KotlinAot => "ktn",
            Language::Nim => "nim",
            Language::Fortran => "fort",
        }
    }

    pub fn kind(&self) -> BridgeKind {
        use BridgeKind::*;
        match self {
            Language::Python => Interpret { program: "python3", pre: &[] },
            Language::Julia => Interpret { program: "julia", pre: &[] },
            Language::JuliaAot => JuliaExe,
            Language::Go => Interpret { program: "go", pre: &["run"] },
            Language::JavaScript => Interpret { program: "node", pre: &[] },
            Language::TypeScript => Interpret { program: "deno", pre: &["run"] },
            Language::Lua => Interpret { program: "lua", pre: &[] },
            Language::R => Interpret { program: "Rscript", pre: &[] },
            Language::Mojo => Interpret { program: "mojo", pre: &[] },
            Language::Zig => Interpret { program: "zig", pre: &["run"] },
            Language::Wasm => Interpret { program: "wasmtime", pre: &["run"] },
            Language::Haskell => Interpret { program: "runghc", pre: &[] },
            Language::Swift => Interpret { program: "swift", pre: &[] },
            Language::Kotlin => Interpret { program: "kotlinc", pre: &["-script"] },
            Language::KotlinAot => KotlinJar,
            Language::Nim => Interpret { program: "nim", pre: &["r"] },
            Language::Fortran => CompileRun { compiler: "gfortran", flags: &[] },
        }
    }

    /// Build the command plan for running `script` with `args`.
    ///
    /// Compiled artifacts are placed in `tmp_dir`, named after this process
    /// so that concurrent hosts do not collide.
    pub fn plan(&self, script: &str, args: &[String], tmp_dir: &Path) -> Plan {
        let pid = std::process::id();
        match self.kind() {
            BridgeKind::Interpret { program, pre } => {
                let mut argv: Vec<String> = pre.iter().map(|s| s.to_string()).collect();
                argv.push(script.to_string());
                argv.extend(args.iter().cloned());
                Plan::new(vec![Step::Run(Invocation::new(program, argv))], Vec::new())
            }
            BridgeKind::CompileRun { compiler, flags } => {
                let out = tmp_dir.join(format!("polyscript_out_{}", pid));
                let out_str = out.to_string_lossy().into_owned();

                let mut cargs: Vec<String> = flags.iter().map(|s| s.to_string()).collect();
                cargs.push(script.to_string());
                cargs.push("-o".to_string());
                cargs.push(out_str.clone());

                Plan::new(
                    vec![
                        Step::Compile(Invocation::new(compiler, cargs)),
                        Step::Run(Invocation::new(out_str, args.to_vec())),
                    ],
                    vec![out],
                )
            }
            BridgeKind::KotlinJar => {
                let jar = tmp_dir.join(format!("polyscript_kt_{}.jar", pid));
                let jar_str = jar.to_string_lossy().into_owned();

                let compile = Invocation::new(
                    "kotlinc",
                    vec![
                        script.to_string(),
                        "-include-runtime".to_string(),
                        "-d".to_string(),
                        jar_str.clone(),
                    ],
                );
                let mut run_args = vec!["-jar".to_string(), jar_str];
                run_args.extend(args.iter().cloned());

                Plan::new(
                    vec![
                        Step::Compile(compile),
                        Step::Run(Invocation::new("java", run_args)),
                    ],
                    vec![jar],
                )
            }
            BridgeKind::JuliaExe => {
                let out = tmp_dir.join(format!("polyscript_julia_{}", pid));
                let out_str = out.to_string_lossy().into_owned();

                let compile = Invocation::new(
                    "juliac",
                    vec!["--output-exe".to_string(), out_str.clone(), script.to_string()],
                );

                Plan::new(
                    vec![
                        Step::Compile(compile),
                        Step::Run(Invocation::new(out_str, args.to_vec())),
                    ],
                    vec![out],
                )
            }
        }
    }
}

impl FromStr for Language {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.name() == s)
            .ok_or_else(|| BridgeError::UnknownLanguage(s.to_string()))
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_names_parse_back() {
        for lang in Language::ALL {
            assert_eq!(lang.name().parse::<Language>().unwrap(), lang);
        }
        assert!(matches!(
            "cobol".parse::<Language>(),
            Err(BridgeError::UnknownLanguage(_))
        ));
    }

    #[test]
    fn test_interpret_plan() {
        let plan = Language::Go.plan("main.go", &strings(&["x", "y"]), Path::new("/tmp"));

        assert!(plan.artifacts().is_empty());
        assert_eq!(plan.steps().len(), 1);
        let Step::Run(inv) = &plan.steps()[0] else {
            panic!("expected a run step");
        };
        assert_eq!(inv.program, "go");
        assert_eq!(inv.args, strings(&["run", "main.go", "x", "y"]));
    }

    #[test]
    fn test_python_plan_forwards_args() {
        let plan = Language::Python.plan("a.py", &strings(&["--flag"]), Path::new("/tmp"));
        let Step::Run(inv) = &plan.steps()[0] else {
            panic!("expected a run step");
        };
        assert_eq!(inv.program, "python3");
        assert_eq!(inv.args, strings(&["a.py", "--flag"]));
    }

    #[test]
    fn test_fortran_compile_then_run() {
        let tmp = PathBuf::from("/scratch");
        let plan = Language::Fortran.plan("prog.f90", &strings(&["1"]), &tmp);
        let out = format!("/scratch/polyscript_out_{}", std::process::id());

        assert_eq!(plan.artifacts(), &[PathBuf::from(&out)]);
        match plan.steps() {
            [Step::Compile(compile), Step::Run(run)] => {
                assert_eq!(compile.program, "gfortran");
                assert_eq!(compile.args, strings(&["prog.f90", "-o", &out]));
                assert_eq!(run.program, out);
                assert_eq!(run.args, strings(&["1"]));
            }
            steps => panic!("unexpected steps: {:?}", steps),
        }
    }

    #[test]
    fn test_kotlin_jar_plan() {
        let plan = Language::KotlinAot.plan("app.kt", &strings(&["a"]), Path::new("/t"));
        let jar = format!("/t/polyscript_kt_{}.jar", std::process::id());

        match plan.steps() {
            [Step::Compile(compile), Step::Run(run)] => {
                assert_eq!(compile.program, "kotlinc");
                assert_eq!(compile.args, strings(&["app.kt", "-include-runtime", "-d", &jar]));
                assert_eq!(run.program, "java");
                assert_eq!(run.args, strings(&["-jar", &jar, "a"]));
            }
            steps => panic!("unexpected steps: {:?}", steps),
        }
    }

    #[test]
    fn test_julia_exe_plan() {
        let plan = Language::JuliaAot.plan("m.jl", &[], Path::new("/t"));
        let out = format!("/t/polyscript_julia_{}", std::process::id());

        match plan.steps() {
            [Step::Compile(compile), Step::Run(run)] => {
                assert_eq!(compile.program, "juliac");
                assert_eq!(compile.args, strings(&["--output-exe", &out, "m.jl"]));
                assert_eq!(run.program, out);
                assert!(run.args.is_empty());
            }
            steps => panic!("unexpected steps: {:?}", steps),
        }
    }
}
