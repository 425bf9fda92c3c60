use crate::reddit::types::Post;

/// View state for the feed viewer. The loop mutates it from keyboard input
/// and fetch outcomes; rendering derives everything else on the fly.
#[derive(Debug, Clone)]
pub struct AppState {
    pub loading: bool,
    pub error: Option<String>,
    pub posts: Vec<Post>,
    pub query: String,
    pub selected: usize,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            loading: true,
            error: None,
            posts: Vec::new(),
            query: String::new(),
            selected: 0,
        }
    }

    /// Posts matching the current query, in feed order.
    pub fn filtered_posts(&self) -> Vec<&Post> {
        filter_posts(&self.posts, &self.query)
    }

    pub fn set_posts(&mut self, posts: Vec<Post>) {
        self.posts = posts;
        self.error = None;
        self.loading = false;
        self.selected = 0;
    }

    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
        self.loading = false;
    }

    pub fn begin_refresh(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn push_query_char(&mut self, ch: char) {
        self.query.push(ch);
        self.selected = 0;
    }

    pub fn backspace_query(&mut self) {
        self.query.pop();
        self.selected = 0;
    }

    pub fn select_next(&mut self) {
        let len = self.filtered_posts().len();
        if len > 0 && self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

/// Pure filter derivation: trim and lowercase the query; an empty query keeps
/// everything. A post matches when its lowercased `title + " " + selftext`
/// contains the query.
pub fn filter_posts<'a>(posts: &'a [Post], query: &str) -> Vec<&'a Post> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return posts.iter().collect();
    }
    posts
        .iter()
        .filter(|p| format!("{} {}", p.title, p.selftext).to_lowercase().contains(&q))
        .collect()
}
