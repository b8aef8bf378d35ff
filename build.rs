//! Emits git metadata (`VERGEN_GIT_*`) that the command-line tools report in
//! their `--debug` output.

use anyhow::Result;
use vergen::EmitBuilder;

fn main() -> Result<()> {
    EmitBuilder::builder()
        .git_sha(true)
        .git_branch()
        .git_commit_date()
        .emit()?;
    Ok(())
}
