use {
    anyhow::{Context, Result},
    cpss_api::ApiClient,
};

pub async fn login(client: &ApiClient, username: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt_password()?,
    };

    client.login(username, &password).await?;
    println!("Logged in as {username}");
    Ok(())
}

pub fn logout(client: &ApiClient) -> Result<()> {
    client.session().clear()?;
    println!("Logged out");
    Ok(())
}

pub fn whoami(client: &ApiClient) -> Result<()> {
    match client.session().principal() {
        Some(principal) => println!("{} @ {}", principal.username, client.base_url()),
        None => println!("Not logged in"),
    }
    Ok(())
}

/// Read the password from stdin. Plain line input; echo suppression is a
/// terminal nicety this console does not carry.
fn prompt_password() -> Result<String> {
    use std::io::Write;

    print!("Password: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
