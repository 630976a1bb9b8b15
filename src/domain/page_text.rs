//! 页面文本
//!
//! 文档文本源的辅助函数：按页切分，并把换行归一为空格

/// 分页符（PDF 转文本工具以 form feed 分隔页面）
pub const PAGE_BREAK: char = '\u{000C}';

/// 将换行归一为空格
///
/// 支持 \n、\r\n 和 \r；首尾空白被去除
pub fn normalize_page_text(text: &str) -> String {
    text.replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .trim()
        .to_string()
}

/// 按分页符切分文档并归一化每页文本
///
/// 空白页保留为空字符串，页码与原文档一一对应；
/// 文档末尾分页符之后的空内容不计为一页
pub fn split_pages(document: &str) -> Vec<String> {
    let mut pages: Vec<String> = document.split(PAGE_BREAK).map(normalize_page_text).collect();

    if pages.len() > 1 && pages.last().is_some_and(|p| p.is_empty()) {
        pages.pop();
    }

    pages
}

/// 选择页面（页码从 1 开始），返回 (页码, 文本)
///
/// `page` 为 None 时返回全部页面；页码越界时返回空列表
pub fn select_pages(pages: &[String], page: Option<usize>) -> Vec<(usize, &str)> {
    match page {
        Some(number) => pages
            .get(number.wrapping_sub(1))
            .map(|text| vec![(number, text.as_str())])
            .unwrap_or_default(),
        None => pages
            .iter()
            .enumerate()
            .map(|(i, text)| (i + 1, text.as_str()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newlines_become_spaces() {
        let text = "\"Christmas won't be Christmas\nwithout any presents,\" grumbled Jo.\r\n";
        assert_eq!(
            normalize_page_text(text),
            "\"Christmas won't be Christmas without any presents,\" grumbled Jo."
        );
    }

    #[test]
    fn test_carriage_returns() {
        assert_eq!(normalize_page_text("a\r\nb\rc\nd"), "a b c d");
    }

    #[test]
    fn test_split_pages_on_form_feed() {
        let doc = "Page one\nline two\u{000C}Page two\u{000C}\u{000C}Page four\u{000C}";
        let pages = split_pages(doc);

        assert_eq!(pages.len(), 4);
        assert_eq!(pages[0], "Page one line two");
        assert_eq!(pages[1], "Page two");
        // 空白页保留
        assert_eq!(pages[2], "");
        assert_eq!(pages[3], "Page four");
    }

    #[test]
    fn test_document_without_breaks_is_one_page() {
        let pages = split_pages("Just one page.");
        assert_eq!(pages, vec!["Just one page.".to_string()]);
    }

    #[test]
    fn test_empty_document_is_one_blank_page() {
        assert_eq!(split_pages(""), vec![String::new()]);
    }

    #[test]
    fn test_select_pages() {
        let pages: Vec<String> = vec!["a".into(), "b".into(), "c".into()];

        assert_eq!(select_pages(&pages, Some(2)), vec![(2, "b")]);
        assert_eq!(select_pages(&pages, None), vec![(1, "a"), (2, "b"), (3, "c")]);
        assert!(select_pages(&pages, Some(4)).is_empty());
        assert!(select_pages(&pages, Some(0)).is_empty());
    }
}
