use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// 以 concat demuxer 串流複製（不重新編碼）的 ffmpeg 指令
#[derive(Debug, Clone)]
pub struct FfmpegConcatCommand {
    program: PathBuf,
    list_path: PathBuf,
    destination_path: PathBuf,
}

impl FfmpegConcatCommand {
    #[must_use]
    pub fn new(program: &Path, list_path: &Path, destination_path: &Path) -> Self {
        Self {
            program: program.to_path_buf(),
            list_path: list_path.to_path_buf(),
            destination_path: destination_path.to_path_buf(),
        }
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    #[must_use]
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-hide_banner",
            "-nostdin",
            "-f", "concat",
            "-safe", "0",
            "-i",
        ]
        .iter()
        .map(OsString::from)
        .collect();

        args.push(self.list_path.clone().into_os_string());
        args.extend(["-c", "copy"].iter().map(OsString::from));
        args.push(self.destination_path.clone().into_os_string());
        args
    }

    /// 建立指令，stdout 與 stderr 都導向管線
    #[must_use]
    pub fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_order() {
        let cmd = FfmpegConcatCommand::new(
            Path::new("ffmpeg"),
            Path::new("/tmp/concat-list.txt"),
            Path::new("/out/Movie.mp4"),
        );
        let args: Vec<String> = cmd
            .args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args,
            vec![
                "-hide_banner",
                "-nostdin",
                "-f",
                "concat",
                "-safe",
                "0",
                "-i",
                "/tmp/concat-list.txt",
                "-c",
                "copy",
                "/out/Movie.mp4",
            ]
        );
    }

    #[test]
    fn test_build_command_program() {
        let cmd = FfmpegConcatCommand::new(
            Path::new("/opt/bin/ffmpeg"),
            Path::new("list.txt"),
            Path::new("out.mp4"),
        );
        assert_eq!(cmd.build_command().get_program(), "/opt/bin/ffmpeg");
        assert_eq!(cmd.program(), Path::new("/opt/bin/ffmpeg"));
    }
}
