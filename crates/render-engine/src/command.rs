//! Engine process construction.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::filter::CropFilterSpec;

/// Hide the console window a child would otherwise open on Windows.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Create a command for an engine executable.
///
/// Every engine process goes through here: stdin is closed, no console
/// window appears on Windows, and the child is killed if its handle is
/// dropped before it exits.
pub fn engine_command(program: &Path) -> Command {
    let mut cmd = Command::new(program);
    cmd.stdin(Stdio::null()).kill_on_drop(true);

    #[cfg(windows)]
    {
        cmd.creation_flags(CREATE_NO_WINDOW);
    }

    cmd
}

/// Arguments for one crop transcode.
#[derive(Debug, Clone)]
pub struct EngineCommand {
    pub input: PathBuf,
    pub output: PathBuf,
    pub filter: CropFilterSpec,
}

impl EngineCommand {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, filter: CropFilterSpec) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            filter,
        }
    }

    /// `-i <input> -vf <filter> -c:a copy -y <output> -progress pipe:1`
    pub fn build_args(&self) -> Vec<OsString> {
        vec![
            "-i".into(),
            self.input.clone().into_os_string(),
            "-vf".into(),
            self.filter.as_str().into(),
            "-c:a".into(),
            "copy".into(),
            "-y".into(),
            self.output.clone().into_os_string(),
            "-progress".into(),
            "pipe:1".into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args() {
        let cmd = EngineCommand::new(
            "/videos/in.mp4",
            "/videos/cropped_in.mp4",
            CropFilterSpec::assemble("1", "2", "3", "4"),
        );

        let args: Vec<String> = cmd
            .build_args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            [
                "-i",
                "/videos/in.mp4",
                "-vf",
                "crop=1:2:3:4",
                "-c:a",
                "copy",
                "-y",
                "/videos/cropped_in.mp4",
                "-progress",
                "pipe:1",
            ]
        );
    }
}
