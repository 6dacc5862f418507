// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use pulldown_cmark::CowStr;
use pulldown_cmark::Event;
use pulldown_cmark::Options;
use pulldown_cmark::Parser;
use pulldown_cmark::Tag;
use pulldown_cmark::html::push_html;

const AUDIO_EXTENSIONS: [&str; 3] = ["mp3", "wav", "ogg"];

pub fn is_audio_file(url: &str) -> bool {
    match url.rsplit('.').next() {
        Some(ext) => AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    }
}

/// Convert Markdown to HTML.
///
/// The optional `url_rewriter` maps image/audio URLs found in the text to
/// the URL the browser should load. Returning `None` drops the media
/// element: a question with a broken picture is still a question.
pub fn markdown_to_html(
    markdown: &str,
    url_rewriter: Option<&dyn Fn(&str) -> Option<String>>,
) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);
    let mut skip_depth: usize = 0;
    let mut events: Vec<Event<'_>> = Vec::new();
    for event in parser {
        if skip_depth > 0 {
            match event {
                Event::Start(Tag::Image { .. }) => skip_depth += 1,
                Event::End(pulldown_cmark::TagEnd::Image) => skip_depth -= 1,
                _ => {}
            }
            continue;
        }
        match event {
            Event::Start(Tag::Image {
                link_type,
                title,
                dest_url,
                id,
            }) => {
                let url = match url_rewriter {
                    Some(rewriter) => rewriter(&dest_url),
                    None => Some(dest_url.to_string()),
                };
                match url {
                    None => {
                        skip_depth = 1;
                    }
                    Some(url) if is_audio_file(&url) => {
                        events.push(Event::Html(CowStr::Boxed(
                            format!(r#"<audio controls src="{url}" title="{title}"></audio>"#)
                                .into_boxed_str(),
                        )));
                        // Swallow the alt text and the end tag.
                        skip_depth = 1;
                    }
                    Some(url) => events.push(Event::Start(Tag::Image {
                        link_type,
                        title,
                        dest_url: CowStr::Boxed(url.into_boxed_str()),
                        id,
                    })),
                }
            }
            other => events.push(other),
        }
    }
    let mut html_output: String = String::new();
    push_html(&mut html_output, events.into_iter());
    html_output
}

/// The destinations of all images embedded in the text, in order.
pub fn media_urls(markdown: &str) -> Vec<String> {
    Parser::new(markdown)
        .filter_map(|event| match event {
            Event::Start(Tag::Image { dest_url, .. }) => Some(dest_url.to_string()),
            _ => None,
        })
        .collect()
}

/// Like [`markdown_to_html`], but strips the enclosing paragraph of
/// single-paragraph text.
pub fn markdown_to_html_inline(
    markdown: &str,
    url_rewriter: Option<&dyn Fn(&str) -> Option<String>>,
) -> String {
    let text = markdown_to_html(markdown, url_rewriter);
    if text.starts_with("<p>") && text.ends_with("</p>\n") && text.matches("<p>").count() == 1 {
        let len = text.len();
        text[3..len - 5].to_string()
    } else {
        text
    }
}
