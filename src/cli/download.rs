use crate::{Res, config::Config, info, letterboxd::LetterboxdSession, success, utils};

/// Logs in and replaces the local export with a fresh one.
///
/// Credentials are checked before any request goes out, and the files in the
/// export folder only change once a complete archive has been received.
///
/// # Errors
///
/// - [`crate::config::ConfigError::MissingKey`] without username or password
/// - [`crate::Error::Auth`] when Letterboxd rejects the login
/// - [`crate::Error::UnexpectedResponse`] / [`crate::Error::Archive`] for a bad export
pub async fn download(config: &Config, session: &mut LetterboxdSession) -> Res<()> {
    let (username, password) = config.credentials()?;
    let dest = config.exports_folder();

    info!("Logging in to Letterboxd as {}", username);
    let pb = utils::spinner("Logging in...");
    let login = session.login(username, password).await;
    pb.finish_and_clear();
    login?;

    let pb = utils::spinner("Downloading export...");
    let export = session.download_export(&dest).await;
    pb.finish_and_clear();
    let filename = export?;

    success!(
        "Data successfully downloaded ({}) and extracted in {}",
        filename,
        dest.display()
    );
    Ok(())
}
