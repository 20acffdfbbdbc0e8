//! Generates documentation by shelling out to `rustdoc`.

use anyhow::{bail, Context as _};

use crate::core::{Package, Workspace};
use crate::util::process_builder::ProcessBuilder;
use crate::util::{paths, HoistResult};

#[derive(Debug, Default)]
pub struct DocOptions {
    /// Open the generated docs in a browser when done.
    pub open_result: bool,
    /// Extra flags passed through to `rustdoc` (after `--`).
    pub args: Vec<String>,
}

pub fn doc(ws: &Workspace<'_>, package: &Package, options: &DocOptions) -> HoistResult<()> {
    let config = ws.config();
    let name = package.name()?;
    let lib_path = package.lib_path();
    if !lib_path.exists() {
        bail!(
            "no library target found for `{name}`: `{}` does not exist",
            lib_path.display()
        );
    }

    let crate_name = name.replace('-', "_");
    let out_dir = ws.target_dir().join("doc");
    paths::create_dir_all(&out_dir)?;

    let mut rustdoc = ProcessBuilder::new("rustdoc");
    rustdoc
        .arg("--crate-name")
        .arg(&crate_name)
        .arg("-o")
        .arg(&out_dir)
        .arg(&lib_path)
        .args(&options.args)
        .cwd(package.root());

    config
        .shell()
        .status("Documenting", format!("{name} v{}", package.version()?))?;
    config
        .shell()
        .verbose(|shell| shell.status("Running", &rustdoc))?;
    rustdoc
        .exec()
        .with_context(|| format!("could not document `{name}`"))?;

    let index = out_dir.join(&crate_name).join("index.html");
    config
        .shell()
        .status("Generated", index.display().to_string())?;

    if options.open_result {
        config
            .shell()
            .status("Opening", index.display().to_string())?;
        opener::open(&index)
            .with_context(|| format!("couldn't open docs at `{}`", index.display()))?;
    }

    Ok(())
}
