// Log filter resolution for the binary.

use tododag::cli::LogLevel;
use tododag::logging::filter_directives;

#[test]
fn cli_flag_wins_over_the_environment() {
    assert_eq!(
        filter_directives(Some(LogLevel::Debug), Some("trace")),
        "warn,tododag=debug"
    );
}

#[test]
fn bare_env_level_applies_to_this_crate_only() {
    assert_eq!(filter_directives(None, Some(" Warning ")), "warn,tododag=warn");
    assert_eq!(filter_directives(None, Some("trace")), "warn,tododag=trace");
}

#[test]
fn env_directives_pass_through() {
    assert_eq!(
        filter_directives(None, Some("tododag::engine=debug,notify=info")),
        "tododag::engine=debug,notify=info"
    );
}

#[test]
fn unset_or_unknown_falls_back_to_info() {
    assert_eq!(filter_directives(None, None), "warn,tododag=info");
    assert_eq!(filter_directives(None, Some("")), "warn,tododag=info");
    assert_eq!(filter_directives(None, Some("loud")), "warn,tododag=info");
}
