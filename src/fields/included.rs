use std::collections::HashSet;

const WILDCARD_ALL: &str = "*all";
const WILDCARD_NAVIGABLE: &str = "*navigable";

/// Per-request field inclusion filter built from the `fields=` query
/// parameter. Grammar: `fields=summary,comment,-description,*all,*navigable`
/// (the parameter may repeat; each occurrence is comma-separated).
///
/// Resolution order is exclude > explicit include > wildcard/default, and any
/// explicit include switches off the caller's default mode unless the
/// matching wildcard is also present. Callers relying on the default
/// therefore get exactly what they asked for and nothing more as soon as a
/// field is named.
#[derive(Debug, Clone)]
pub struct IncludedFields {
    included: HashSet<String>,
    excluded: HashSet<String>,
    include_all: bool,
    include_navigable: bool,
}

impl IncludedFields {
    /// Filter for endpoints that return every field unless told otherwise
    /// (single-issue view).
    pub fn include_all_by_default<S: AsRef<str>>(params: &[S]) -> Self {
        Self::parse(true, false, params)
    }

    /// Filter for endpoints that default to navigable fields only.
    pub fn include_navigable_by_default<S: AsRef<str>>(params: &[S]) -> Self {
        Self::parse(false, true, params)
    }

    fn parse<S: AsRef<str>>(
        include_all_by_default: bool,
        include_navigable_by_default: bool,
        params: &[S],
    ) -> Self {
        let mut included = HashSet::new();
        let mut excluded = HashSet::new();
        let mut all = false;
        let mut navigable = false;

        for param in params {
            for token in param.as_ref().split(',') {
                let token = token.trim();
                if token.is_empty() {
                    continue;
                }
                if token == WILDCARD_ALL {
                    all = true;
                } else if token == WILDCARD_NAVIGABLE {
                    navigable = true;
                } else if let Some(id) = token.strip_prefix('-') {
                    excluded.insert(id.to_string());
                } else {
                    included.insert(token.to_string());
                }
            }
        }

        // Naming any field explicitly suppresses both caller defaults; only
        // the wildcards re-enable them.
        let explicit = !included.is_empty();
        Self {
            include_all: all || (include_all_by_default && !explicit),
            include_navigable: navigable || (include_navigable_by_default && !explicit),
            included,
            excluded,
        }
    }

    pub fn included(&self, field_id: &str, navigable: bool) -> bool {
        if self.excluded.contains(field_id) {
            return false;
        }
        if self.included.contains(field_id) {
            return true;
        }
        if self.include_all {
            return true;
        }
        self.include_navigable && navigable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_default(params: &[&str]) -> IncludedFields {
        IncludedFields::include_all_by_default(params)
    }

    fn navigable_default(params: &[&str]) -> IncludedFields {
        IncludedFields::include_navigable_by_default(params)
    }

    #[test]
    fn empty_params_keep_caller_default() {
        let include = all_default(&[]);
        assert!(include.included("summary", true));
        assert!(include.included("votes", false));

        let include = navigable_default(&[]);
        assert!(include.included("summary", true));
        assert!(!include.included("votes", false));
    }

    #[test]
    fn exclusion_wins_over_explicit_inclusion() {
        let include = all_default(&["summary,-summary"]);
        assert!(!include.included("summary", true));
    }

    #[test]
    fn exclusion_wins_over_wildcard() {
        let include = all_default(&["*all,-comment"]);
        assert!(include.included("summary", true));
        assert!(!include.included("comment", true));
    }

    #[test]
    fn explicit_inclusion_suppresses_default() {
        // Naming one field flips off the include-all default
        let include = all_default(&["summary"]);
        assert!(include.included("summary", true));
        assert!(!include.included("description", true));

        // ...and the include-navigable default too
        let include = navigable_default(&["votes"]);
        assert!(include.included("votes", false));
        assert!(!include.included("summary", true));
    }

    #[test]
    fn wildcard_restores_default_alongside_explicit() {
        let include = all_default(&["*all,summary"]);
        assert!(include.included("description", true));

        let include = navigable_default(&["*navigable,votes"]);
        assert!(include.included("summary", true));
        assert!(include.included("votes", false));
        assert!(!include.included("watches", false));
    }

    #[test]
    fn bare_exclusions_keep_default_visibility() {
        let include = all_default(&["-comment"]);
        assert!(include.included("summary", true));
        assert!(!include.included("comment", true));
    }

    #[test]
    fn repeated_params_merge() {
        let include = all_default(&["summary", "comment,-description"]);
        assert!(include.included("summary", true));
        assert!(include.included("comment", true));
        assert!(!include.included("description", true));
        assert!(!include.included("priority", true));
    }

    #[test]
    fn blank_tokens_are_ignored() {
        let include = all_default(&["", " , ,summary"]);
        assert!(include.included("summary", true));
        assert!(!include.included("description", true));
    }
}
