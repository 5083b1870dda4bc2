use anyhow::{Result, bail};
use std::io::{self, BufRead, IsTerminal};
use zeroize::Zeroizing;

pub const PASSWORD_ENV: &str = "PWSEAL_PASSWORD";

/// Reads the password for an existing blob.
///
/// `stdin_free` is false when stdin carries the payload, in which case the
/// password can only come from the environment or the terminal.
pub fn read_password(stdin_free: bool) -> Result<Zeroizing<String>> {
    if let Some(pw) = from_env() {
        return Ok(pw);
    }

    //  echo "supersecret" | pwseal decrypt -i config.sealed
    if stdin_free && !io::stdin().is_terminal() {
        return from_stdin_line();
    }

    let pw = Zeroizing::new(rpassword::prompt_password("Password: ")?);
    if pw.is_empty() {
        bail!("No password provided");
    }
    Ok(pw)
}

/// Reads the password for a new blob, asking twice when interactive.
pub fn read_new_password(stdin_free: bool) -> Result<Zeroizing<String>> {
    if let Some(pw) = from_env() {
        return Ok(pw);
    }

    if stdin_free && !io::stdin().is_terminal() {
        return from_stdin_line();
    }

    let pw1 = Zeroizing::new(rpassword::prompt_password("New password: ")?);
    let pw2 = Zeroizing::new(rpassword::prompt_password("Confirm password: ")?);

    if pw1.is_empty() {
        bail!("password cannot be empty");
    }

    if *pw1 != *pw2 {
        bail!("passwords do not match");
    }

    Ok(pw1)
}

//  PWSEAL_PASSWORD="supersecret" pwseal encrypt -i config.json
fn from_env() -> Option<Zeroizing<String>> {
    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Zeroizing::new)
}

fn from_stdin_line() -> Result<Zeroizing<String>> {
    let mut buf = Zeroizing::new(String::new());
    io::stdin().lock().read_line(&mut buf)?;
    trim_newline(&mut buf);

    if buf.is_empty() {
        bail!("No password provided");
    }
    Ok(buf)
}

fn trim_newline(s: &mut String) {
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
}
