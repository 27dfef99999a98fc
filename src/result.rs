/// Outcome of one resolution pass: the populated object, or the diagnostics
#[derive(Debug, Clone)]
pub struct EnvResult<T> {
    env: T,
    errors: Vec<String>,
}

impl<T> EnvResult<T> {
    pub fn create_success(env: T) -> Self {
        Self {
            env,
            errors: Vec::new(),
        }
    }

    /// A failed pass carries an empty (default) object
    pub fn create_failure(errors: Vec<String>) -> Self
    where
        T: Default,
    {
        Self {
            env: T::default(),
            errors,
        }
    }

    /// The populated object, or an empty one if there were loading errors
    pub fn environment(&self) -> &T {
        &self.env
    }

    pub fn into_environment(self) -> T {
        self.env
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<T, Vec<String>> {
        if self.errors.is_empty() {
            Ok(self.env)
        } else {
            Err(self.errors)
        }
    }
}
