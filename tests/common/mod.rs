#![allow(dead_code)]

use git2::{Oid, Repository, Signature};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Commit `file` with `content` on HEAD of `repo`.
pub fn commit_file(repo: &Repository, file: &str, content: &str, message: &str) -> Oid {
    let workdir = repo.workdir().expect("non-bare repo");
    fs::write(workdir.join(file), content).expect("Could not write file");

    let mut index = repo.index().expect("Could not get index");
    index
        .add_path(Path::new(file))
        .expect("Could not add file to index");
    index.write().expect("Could not write index");
    let tree_id = index.write_tree().expect("Could not write tree");
    let tree = repo.find_tree(tree_id).expect("Could not find tree");

    let sig = Signature::now("Test User", "test@example.com").expect("Could not create sig");
    let parents = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().expect("HEAD is a commit")],
        Err(_) => Vec::new(),
    };
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
        .expect("Could not create commit")
}

/// Repository with `version.txt` at 1.9.0 tagged `v1.9.0`, one commit after
/// the tag, and both `main` and `develop` branches.
pub fn setup_flow_repo() -> (TempDir, Repository) {
    let temp_dir = TempDir::new().expect("Could not create temp dir");
    let repo = Repository::init(temp_dir.path()).expect("Could not init git repo");

    let first = commit_file(&repo, "version.txt", "1.9.0\n", "chore: initial version");
    repo.tag_lightweight("v1.9.0", &repo.find_object(first, None).unwrap(), false)
        .expect("Could not create tag");
    let second = commit_file(&repo, "README.md", "flow\n", "feat: add readme");

    let head = repo.find_commit(second).unwrap();
    for name in ["main", "develop"] {
        if repo.find_branch(name, git2::BranchType::Local).is_err() {
            repo.branch(name, &head, false).expect("Could not create branch");
        }
    }
    drop(head);

    (temp_dir, repo)
}
