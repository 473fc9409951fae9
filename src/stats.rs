use crate::model::Story;

/// Counts reported by `twison check`.
#[derive(Debug, Default, PartialEq)]
pub struct StoryStats {
    pub passages: usize,
    pub links: usize,
    pub broken_links: usize,
    pub with_props: usize,
    pub with_metadata: usize,
    pub with_variables: usize,
    /// (passage name, link target) in document order.
    pub broken: Vec<(String, String)>,
}

impl StoryStats {
    pub fn collect(story: &Story) -> Self {
        let mut stats = StoryStats {
            passages: story.passages.len(),
            ..Default::default()
        };

        for passage in &story.passages {
            stats.with_props += usize::from(passage.props.is_some());
            stats.with_metadata += usize::from(passage.metadata.is_some());
            stats.with_variables += usize::from(passage.variables.is_some());

            for link in passage.links.iter().flatten() {
                stats.links += 1;
                if link.is_broken() {
                    stats
                        .broken
                        .push((passage.name.clone(), link.name.clone()));
                }
            }
        }

        stats.broken_links = stats.broken.len();
        stats
    }

    pub fn print(&self) {
        println!("Passages:       {}", self.passages);
        println!("Links:          {}", self.links);
        println!("Broken links:   {}", self.broken_links);
        println!("With props:     {}", self.with_props);
        println!("With metadata:  {}", self.with_metadata);
        println!("With variables: {}", self.with_variables);

        if !self.broken.is_empty() {
            println!("\n--- Broken links ---");
            for (passage, target) in &self.broken {
                println!("  {} -> {}", passage, target);
            }
        }
    }
}
