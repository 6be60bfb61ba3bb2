//! Storage paths for mark images.

/// Base directory for mark images.
pub const DEFAULT_BASE_PATH: &str = "marks";

/// Storage path for an image under [`DEFAULT_BASE_PATH`].
///
/// Images are spread over nested directories named by the first one to four
/// characters of the (uppercased) mark code:
///
/// ```
/// use geodetic_marks::images::image_path;
///
/// assert_eq!(image_path("ABCD12P1.jpg"), "marks/A/AB/ABC/ABCD/ABCD12P1.jpg");
/// ```
///
/// The filename is not validated.
pub fn image_path(filename: &str) -> String {
    image_path_in(DEFAULT_BASE_PATH, filename)
}

/// Storage path for an image under a custom base directory.
pub fn image_path_in(base: &str, filename: &str) -> String {
    let code: Vec<char> = filename
        .chars()
        .take(4)
        .collect::<String>()
        .to_uppercase()
        .chars()
        .collect();

    let mut parts = Vec::with_capacity(6);
    parts.push(base.to_string());
    for len in 1..=4 {
        parts.push(code.iter().take(len).collect());
    }
    parts.push(filename.to_string());
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_prefix_directories() {
        assert_eq!(image_path("ABCD12P1.jpg"), "marks/A/AB/ABC/ABCD/ABCD12P1.jpg");
    }

    #[test]
    fn code_is_uppercased_but_filename_kept() {
        assert_eq!(image_path("ab1d1203.jpg"), "marks/A/AB/AB1/AB1D/ab1d1203.jpg");
    }

    #[test]
    fn invalid_names_still_get_a_path() {
        assert_eq!(image_path("notes.txt"), "marks/N/NO/NOT/NOTE/notes.txt");
    }

    #[test]
    fn short_names_repeat_the_prefix() {
        assert_eq!(image_path("ab"), "marks/A/AB/AB/AB/ab");
    }

    #[test]
    fn custom_base() {
        assert_eq!(
            image_path_in("/data/images", "WXYZ99R.tif"),
            "/data/images/W/WX/WXY/WXYZ/WXYZ99R.tif"
        );
    }
}
