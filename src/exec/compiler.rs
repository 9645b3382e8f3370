// src/exec/compiler.rs

use std::process::Stdio;

use anyhow::Context;
use tracing::info;

use super::backend::{BoxFuture, BuildOutput, BuildRequest, Compiler};
use super::{shell_command, shell_quote};
use crate::errors::Result;

/// Runs `<program> build -o <output> <extra> <entry>` through the shell.
#[derive(Debug, Clone)]
pub struct ShellCompiler {
    program: String,
}

impl ShellCompiler {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn command_line(&self, request: &BuildRequest) -> String {
        let mut parts = vec![
            self.program.clone(),
            "build".to_string(),
            "-o".to_string(),
            shell_quote(&request.output.to_string_lossy()),
        ];
        if !request.extra_args.trim().is_empty() {
            parts.push(request.extra_args.trim().to_string());
        }
        parts.push(shell_quote(&request.entry.to_string_lossy()));
        parts.join(" ")
    }
}

impl Compiler for ShellCompiler {
    fn build(&self, request: BuildRequest) -> BoxFuture<'_, Result<BuildOutput>> {
        let line = self.command_line(&request);

        Box::pin(async move {
            info!(cmd = %line, "build command");

            let output = shell_command(&line)
                .stdin(Stdio::null())
                .output()
                .await
                .with_context(|| format!("running build command `{line}`"))?;

            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));

            Ok(BuildOutput {
                success: output.status.success(),
                exit_code: output.status.code(),
                output: combined,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn request(extra: &str) -> BuildRequest {
        BuildRequest {
            entry: PathBuf::from("main.go"),
            output: PathBuf::from("./main"),
            extra_args: extra.to_string(),
        }
    }

    #[test]
    fn command_line_without_extra_args() {
        let compiler = ShellCompiler::new("go");
        assert_eq!(compiler.command_line(&request("")), "go build -o ./main main.go");
    }

    #[test]
    fn extra_args_are_passed_verbatim() {
        let compiler = ShellCompiler::new("go");
        assert_eq!(
            compiler.command_line(&request("-mod=vendor -race")),
            "go build -o ./main -mod=vendor -race main.go"
        );
    }

    #[test]
    fn paths_with_spaces_are_quoted() {
        let compiler = ShellCompiler::new("go");
        let mut req = request("");
        req.output = PathBuf::from("my bin/main");
        assert_eq!(
            compiler.command_line(&req),
            "go build -o \"my bin/main\" main.go"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_command_reports_output_and_status() {
        // `sh` stands in for a toolchain: `sh build ...` fails with a message.
        let compiler = ShellCompiler::new("sh");
        let out = compiler.build(request("")).await.unwrap();
        assert!(!out.success);
        assert!(!out.output.is_empty());
    }
}
