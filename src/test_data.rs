#[cfg(test)]
pub const POST_WITH_HEADER: &str = "Tags: self-hosting, markdown, notes
Date: 2022-04-02
PublishDate: 2022-04-02 12:05
Featured: true

# Running a blog from a folder of text files
Why keep a blog in plain files?

Files outlive platforms. A folder of markdown can be copied, grepped, versioned and
read by people who have never heard of the tool that renders it.

## The setup

### One file per post

Every post is a `.md` file whose name becomes its address. The first lines carry a
little metadata and the first heading is the title. __Nothing else needs to be configured.__
Images go in the assets folder and are resized on request.
";

#[cfg(test)]
pub const POST_PLAIN: &str = "Some notes written without any metadata.

They are kept as they are, the file name becomes the title
and nothing else is filled in.
";
