mod build_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Returns the main version identifier as used for releases, e.g. `v1.4`.
pub fn identifier() -> String {
    let digits = build_info::PKG_VERSION.strip_suffix(".0").unwrap_or(build_info::PKG_VERSION);
    format!("v{digits}")
}

/// Returns an RFC 2822 formatted date of the build time in UTC.
pub fn build_time_utc() -> &'static str {
    build_info::BUILT_TIME_UTC
}

/// Returns the commit hash this was built from, if built from a git checkout.
pub fn git_commit_hash() -> Option<&'static str> {
    build_info::GIT_COMMIT_HASH
}

/// Returns whether the git working directory was dirty when this was built.
pub fn git_was_dirty() -> bool {
    // `None` happens in CI runners and outside of git checkouts.
    build_info::GIT_DIRTY == Some(true)
}

/// Returns a string containing all version-related information.
pub fn full() -> String {
    format!(
        "{} ({}{}), built {}",
        identifier(),
        git_commit_hash().unwrap_or("unknown commit"),
        if git_was_dirty() { ", dirty" } else { "" },
        build_time_utc(),
    )
}


#[cfg(test)]
mod tests {
    #[test]
    fn identifier_has_no_patch_zero() {
        let id = super::identifier();
        assert!(id.starts_with('v'));
        assert_eq!(id.matches('.').count(), 1, "unexpected identifier {id}");
    }
}
