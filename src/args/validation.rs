use serde_json::Value;
use std::{fs, path::PathBuf};

/// # Errors
///
/// Will return `Err` if the file is not readable
pub fn check_readable_file(file: &str) -> Result<String, String> {
    // split by semi-colon
    for file in file.split(';').map(str::trim).filter(|f| !f.is_empty()) {
        let path = PathBuf::from(file);
        if !path.is_file() || fs::metadata(&path).is_err() {
            return Err(format!("The sql startup script '{file}' is not readable."));
        }
    }
    Ok(file.to_string())
}

/// # Errors
///
/// Will return `Err` if the file is not readable or is not valid seed json
pub fn check_readable_file_and_json(file: &str) -> Result<Value, String> {
    let path = PathBuf::from(file);
    if !path.is_file() {
        return Err(format!("The json file '{file}' is not readable."));
    }
    let contents = fs::read_to_string(&path)
        .map_err(|e| format!("The json file '{file}' is not readable: {e}"))?;
    let json: Value = serde_json::from_str(&contents)
        .map_err(|e| format!("The json file '{file}' is not valid json: {e}"))?;
    validate_json_format(&json)?;
    Ok(json)
}

fn array_of<'a>(value: &'a Value, key: &str, context: &str) -> Result<&'a [Value], String> {
    match &value[key] {
        Value::Null => Ok(&[]),
        Value::Array(items) => Ok(items),
        _ => Err(format!("The json key {key} in {context} is not an array.")),
    }
}

/// Validate the seed file format:
/// { "clubs": [{ "name": "..", "city": "..", "country": "..", "website": "..",
///     "courses": [{ "name": "..", "default_par": 72,
///         "holes": [{ "hole_number": 1, "par": 4, "stroke_index": 7, "length_yards": 380 }, ...] }] }]
/// , "players": [{ "first_name": "..", "last_name": "..", "handicap": 12.4,
///     "user_id": ".." } or { .., "created_by": ".." }] }
///
/// # Errors
///
/// Will return `Err` if the json is not in the correct format
pub fn validate_json_format(json: &Value) -> Result<(), String> {
    let Some(root) = json.as_object() else {
        return Err("The json file is not in the correct format. Expected an object.".to_string());
    };
    let expected_keys = ["clubs", "players"];
    if let Some(key) = root.keys().find(|k| !expected_keys.contains(&k.as_str())) {
        return Err(format!(
            "Unexpected json key {key}. Expected keys: {expected_keys:?}"
        ));
    }

    for club in array_of(json, "clubs", "the seed file")? {
        if !club["name"].is_string() {
            return Err("Every club needs a string name.".to_string());
        }
        for course in array_of(club, "courses", "a club")? {
            if !course["name"].is_string() {
                return Err("Every course needs a string name.".to_string());
            }
            if !course["default_par"].is_null() && !course["default_par"].is_i64() {
                return Err("The json key default_par must be a number.".to_string());
            }
            for hole in array_of(course, "holes", "a course")? {
                if !hole["hole_number"].is_i64() || !hole["par"].is_i64() {
                    return Err(
                        "The json key holes is not in the correct format. Expected objects with keys hole_number and par."
                            .to_string(),
                    );
                }
            }
        }
    }

    for player in array_of(json, "players", "the seed file")? {
        if !player["first_name"].is_string() || !player["last_name"].is_string() {
            return Err("Every player needs a first_name and last_name.".to_string());
        }
        if player["user_id"].is_string() == player["created_by"].is_string() {
            return Err(
                "Every player needs exactly one of user_id or created_by.".to_string(),
            );
        }
    }
    Ok(())
}
