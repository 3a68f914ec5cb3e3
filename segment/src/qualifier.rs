/// Interchange ID qualifier (ISA-05 / ISA-07)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Qualifier<'buf> {
    value: &'buf str,
}

impl<'buf> From<&'buf str> for Qualifier<'buf> {
    fn from(value: &'buf str) -> Self {
        Qualifier {
            value: value.trim(),
        }
    }
}

impl<'buf> Qualifier<'buf> {
    pub fn is_blank(&self) -> bool {
        self.value.is_empty()
    }

    /// Prefix `id` with this qualifier as `QUALIFIER:ID`, or return `id`
    /// unchanged when the qualifier is blank
    pub fn qualify(&self, id: &str) -> String {
        if self.is_blank() {
            id.trim().to_owned()
        } else {
            format!("{}:{}", self.value, id.trim())
        }
    }
}
