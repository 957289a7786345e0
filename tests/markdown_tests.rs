use needsflow::flow::markdown::{is_safe_html, to_html};

#[test]
fn bold_and_links_render_and_stay_stable() {
    let html = to_html("**Call** [Fix-It-Fast](https://example.com/plumbers) today");
    assert_eq!(
        html,
        "<p><strong>Call</strong> <a href=\"https://example.com/plumbers\">Fix-It-Fast</a> today</p>\n"
    );
    assert_eq!(to_html(&html), html);
}

#[test]
fn script_blocks_are_escaped() {
    let html = to_html("<script>alert('x')</script>\n\nafter");
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
    assert!(html.contains("<p>after</p>"));
    assert_eq!(to_html(&html), html);
}

#[test]
fn allowed_block_html_passes_through() {
    let source = "<table>\n<tr><td>1</td></tr>\n</table>\n";
    let html = to_html(source);
    assert_eq!(html, source);
    assert!(is_safe_html(&html));
}

#[test]
fn empty_input_renders_nothing() {
    assert_eq!(to_html(""), "");
}
