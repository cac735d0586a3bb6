use error_common::SkribeError;
use std::fmt;
use std::str::FromStr;

/// Navigable locations of the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Landing,
    Dashboard,
    NewSession,
    Session(String),
    /// Public patient view, the target of issued QR codes
    PatientSummary(String),
}

impl Route {
    pub fn path(&self) -> String {
        self.to_string()
    }

    pub fn session_id(&self) -> Option<&str> {
        match self {
            Route::Session(id) | Route::PatientSummary(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Landing => f.write_str("/"),
            Route::Dashboard => f.write_str("/dashboard"),
            Route::NewSession => f.write_str("/session/new"),
            Route::Session(id) => write!(f, "/session/{}", id),
            Route::PatientSummary(id) => write!(f, "/patient/{}", id),
        }
    }
}

impl FromStr for Route {
    type Err = SkribeError;

    /// Accepts a bare path or a full URL such as the one embedded in a QR code
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let path = match input.find("://") {
            Some(scheme_end) => {
                let rest = &input[scheme_end + 3..];
                rest.find('/').map_or("/", |slash| &rest[slash..])
            }
            None => input,
        };
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Ok(Route::Landing),
            ["dashboard"] => Ok(Route::Dashboard),
            ["session", "new"] => Ok(Route::NewSession),
            ["session", id] => Ok(Route::Session(id.to_string())),
            ["patient", id] => Ok(Route::PatientSummary(id.to_string())),
            _ => Err(SkribeError::ValidationError(format!("unknown route '{}'", input))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(Route::Landing.path(), "/");
        assert_eq!(Route::Dashboard.path(), "/dashboard");
        assert_eq!(Route::NewSession.path(), "/session/new");
        assert_eq!(Route::Session("abc".into()).path(), "/session/abc");
        assert_eq!(Route::PatientSummary("abc".into()).path(), "/patient/abc");
    }

    #[test]
    fn test_parse_paths_and_qr_urls() {
        assert_eq!("/".parse::<Route>().unwrap(), Route::Landing);
        assert_eq!("/dashboard/".parse::<Route>().unwrap(), Route::Dashboard);
        assert_eq!("/session/new".parse::<Route>().unwrap(), Route::NewSession);
        assert_eq!("/session/s-9".parse::<Route>().unwrap(), Route::Session("s-9".into()));
        assert_eq!(
            "http://localhost:3000/patient/s-9?ref=qr".parse::<Route>().unwrap(),
            Route::PatientSummary("s-9".into())
        );
        assert_eq!("https://skribe.example".parse::<Route>().unwrap(), Route::Landing);
    }

    #[test]
    fn test_unknown_paths_are_rejected() {
        assert!("/settings".parse::<Route>().is_err());
        assert!("/session/a/b".parse::<Route>().is_err());
    }
}
