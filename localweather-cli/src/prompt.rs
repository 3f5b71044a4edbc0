//! Interactive prompts shown in the terminal.

use anyhow::Result;
use inquire::{Confirm, CustomType, InquireError, Password, Select, Text};

use localweather_core::{Config, Coordinates, Permission, PermissionSetting};

const TURN_ON: &str = "Turn on";
const NOT_NOW: &str = "Not now";

/// Turn the stored permission setting into a decision, asking if needed.
pub fn resolve_permission(setting: PermissionSetting) -> Result<Permission> {
    match setting {
        PermissionSetting::Granted => Ok(Permission::Granted),
        PermissionSetting::Denied => Ok(Permission::Denied),
        PermissionSetting::Ask => {
            let answer = Confirm::new("Allow localweather to access this machine's location?")
                .with_default(true)
                .with_help_message("Coordinates are only sent to the weather service")
                .prompt();

            match dismissed(answer)? {
                Some(true) => Ok(Permission::Granted),
                Some(false) | None => Ok(Permission::Denied),
            }
        }
    }
}

/// Modal shown when location is switched off. Returns `true` if the user turned it on.
pub fn location_off() -> Result<bool> {
    let answer = Select::new(
        "Location is turned off. Turn it on to see the weather where you are?",
        vec![TURN_ON, NOT_NOW],
    )
    .prompt();

    Ok(dismissed(answer)? == Some(TURN_ON))
}

/// Walk through every setting, keeping current values as defaults.
pub fn configure(config: &mut Config) -> Result<()> {
    let has_key = config.openweather.api_key.is_some();
    let key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message(if has_key {
            "Leave empty to keep the current key"
        } else {
            "Get one at https://openweathermap.org/api"
        })
        .prompt()?;
    if !key.trim().is_empty() {
        config.set_api_key(key.trim().to_string());
    }

    let permissions = vec!["ask", "granted", "denied"];
    let cursor = match config.location.permission {
        PermissionSetting::Ask => 0,
        PermissionSetting::Granted => 1,
        PermissionSetting::Denied => 2,
    };
    let choice = Select::new("Location access:", permissions)
        .with_starting_cursor(cursor)
        .prompt()?;
    config.location.permission = match choice {
        "granted" => PermissionSetting::Granted,
        "denied" => PermissionSetting::Denied,
        _ => PermissionSetting::Ask,
    };

    config.location.enabled = Confirm::new("Turn location on?")
        .with_default(config.location.enabled)
        .prompt()?;

    let use_fixed = Confirm::new("Use fixed coordinates as the known location?")
        .with_default(config.location.fixed_coordinates().is_some())
        .prompt()?;
    let fixed = if use_fixed {
        Some(prompt_coordinates(config)?)
    } else {
        None
    };
    config.location.set_fixed_coordinates(fixed);

    config.location.network_lookup =
        Confirm::new("Look up location from your IP address when no fixed location is set?")
            .with_default(config.location.network_lookup)
            .prompt()?;

    let lang = Text::new("Language for conditions (e.g. en, de):")
        .with_initial_value(config.lang.as_deref().unwrap_or_default())
        .with_help_message("Leave empty to follow the system locale")
        .prompt()?;
    config.lang = Some(lang.trim().to_string()).filter(|l| !l.is_empty());

    Ok(())
}

fn prompt_coordinates(config: &Config) -> Result<Coordinates> {
    let current = config.location.fixed_coordinates();

    loop {
        let mut lat = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please enter a number, e.g. 48.8566");
        if let Some(c) = current {
            lat = lat.with_default(c.latitude);
        }

        let mut lon = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please enter a number, e.g. 2.3522");
        if let Some(c) = current {
            lon = lon.with_default(c.longitude);
        }

        match Coordinates::new(lat.prompt()?, lon.prompt()?) {
            Ok(coords) => return Ok(coords),
            Err(e) => eprintln!("{e}; latitude must be within ±90 and longitude within ±180."),
        }
    }
}

/// Treat Esc / Ctrl-C / no terminal as "dismissed" rather than as an error.
fn dismissed<T>(answer: Result<T, InquireError>) -> Result<Option<T>> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(InquireError::NotTTY) => {
            tracing::warn!(
                "no terminal to prompt on; set [location] permission in the config file"
            );
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
