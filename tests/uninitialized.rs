//! Runs in its own process, where nothing ever installs a context.

use dragon_web::{AppContext, Error};

#[test]
fn instance_before_install_is_not_initialized() {
    assert!(!AppContext::is_installed());
    assert!(matches!(AppContext::instance(), Err(Error::NotInitialized)));
    assert!(matches!(
        dragon_web::config::<bool>("debug"),
        Err(Error::NotInitialized)
    ));
    assert!(matches!(
        dragon_web::set_config("debug", true),
        Err(Error::NotInitialized)
    ));
}
