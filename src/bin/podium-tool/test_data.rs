pub const POST_DATA: &str = "Tags: rust, web
Date: 2024-02-27
Draft: true
Featured: true

# This is a title

";
