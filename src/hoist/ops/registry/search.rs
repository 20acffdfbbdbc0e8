use anyhow::Context as _;

use crate::drop_println;
use crate::ops::registry::{registry, RegistryOrIndex};
use crate::util::style::{HEADER, LITERAL, NOTE};
use crate::util::{truncate_with_ellipsis, Config, HoistResult};

/// Searches the registry and prints the matches as manifest-ready lines.
pub fn search(
    query: &str,
    config: &Config,
    limit: u32,
    reg_or_index: Option<&RegistryOrIndex>,
) -> HoistResult<()> {
    let limit = limit.clamp(1, 100);
    let mut registry = registry(config, None, reg_or_index, false)?;
    let (packages, total) = registry
        .search(query, limit)
        .with_context(|| format!("failed to search `{}`", registry.host()))?;

    let names = packages
        .iter()
        .map(|pkg| format!("{} = \"{}\"", pkg.name, pkg.max_version))
        .collect::<Vec<_>>();
    let longest = names.iter().map(|s| s.len()).max().unwrap_or(0);

    let literal = LITERAL.render();
    let header = HEADER.render();
    let note = NOTE.render();
    let reset = anstyle::Reset.render();

    for (pkg, name) in packages.iter().zip(&names) {
        let description = pkg
            .description
            .as_ref()
            .map(|desc| truncate_with_ellipsis(&desc.replace('\n', " "), 62));
        match description {
            Some(description) => drop_println!(
                config,
                "{literal}{name: <longest$}{reset} {note}#{reset} {description}"
            ),
            None => drop_println!(config, "{literal}{name}{reset}"),
        }
    }

    let extra = total.saturating_sub(packages.len() as u32);
    if extra > 0 {
        drop_println!(
            config,
            "{header}... and {extra} more packages{reset} (use the --limit flag to see more)"
        );
    }
    if packages.is_empty() {
        config
            .shell()
            .note(format!("no packages found for query `{query}`"))?;
    }

    Ok(())
}
