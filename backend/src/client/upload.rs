use std::path::Path;

use crate::constants::NAME_LIST_EXTENSION;

/// True when `path` has the extension bulk uploads accept.
pub fn is_name_list_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == NAME_LIST_EXTENSION)
}

/// One name per line; surrounding whitespace and blank lines are dropped.
pub fn parse_name_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_are_ignored() {
        let names = parse_name_list("Anders\n\n  Brightwater  \r\n\t\nCole\n");
        assert_eq!(names, vec!["Anders", "Brightwater", "Cole"]);
        assert!(parse_name_list("\n  \n").is_empty());
    }

    #[test]
    fn test_only_txt_files_accepted() {
        assert!(is_name_list_file(Path::new("names.txt")));
        assert!(is_name_list_file(Path::new("/tmp/list/names.txt")));
        assert!(!is_name_list_file(Path::new("names.csv")));
        assert!(!is_name_list_file(Path::new("names.TXT")));
        assert!(!is_name_list_file(Path::new("names")));
    }
}
